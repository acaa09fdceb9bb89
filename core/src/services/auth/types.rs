//! Types exchanged with the session flows

use serde::{Deserialize, Serialize};

use crate::domain::entities::session::Session;
use crate::domain::entities::token::TokenPair;

/// Client details recorded on a session at login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(default)]
    pub device_info: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub ip_address: String,
}

/// Outcome of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub session: Session,
    pub tokens: TokenPair,
}
