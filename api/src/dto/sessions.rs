//! Bodies for the session endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vc_core::domain::entities::session::Session;

/// Body of `POST /api/v1/sessions/refresh`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshRequest {
    pub session_id: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Body of `POST /api/v1/sessions/logout`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoutRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoutAllResponse {
    pub message: String,
    pub sessions_closed: usize,
}

/// Session as listed to its owner; the refresh token is never returned
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub device_info: String,
    pub user_agent: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            device_info: session.device_info,
            user_agent: session.user_agent,
            ip_address: session.ip_address,
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}
