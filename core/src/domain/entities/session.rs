//! Login session entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A login session bound to one owner and the refresh token issued with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,

    /// Owner of the session
    pub user_id: String,

    /// Refresh token issued at login
    pub refresh_token: String,

    /// Client-reported device description
    pub device_info: String,

    pub user_agent: String,

    pub ip_address: String,

    /// Absolute expiry, never extended
    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session with a fresh identifier
    ///
    /// # Arguments
    ///
    /// * `user_id` - Owner of the session
    /// * `refresh_token` - Refresh token issued with this login
    /// * `lifetime` - How long the session lives
    ///
    /// # Returns
    ///
    /// A new `Session` with empty client metadata. A lifetime past the
    /// representable range saturates at the latest instant.
    pub fn new(user_id: impl Into<String>, refresh_token: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            refresh_token: refresh_token.into(),
            device_info: String::new(),
            user_agent: String::new(),
            ip_address: String::new(),
            expires_at: now.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
            created_at: now,
        }
    }

    pub fn with_device_info(mut self, device_info: impl Into<String>) -> Self {
        self.device_info = device_info.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
