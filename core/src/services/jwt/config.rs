//! Configuration for the signing service

use chrono::Duration;
use vc_shared::config::auth::DEFAULT_JWT_SECRET;
use vc_shared::JwtConfig;

use crate::domain::entities::token::lifetime_from_seconds;

/// Configuration for the signing service
#[derive(Clone)]
pub struct JwtServiceConfig {
    /// HMAC signing secret
    pub secret: String,
    /// `iss` claim on every token
    pub issuer: String,
    pub access_token_lifetime: Duration,
    pub refresh_token_lifetime: Duration,
}

impl Default for JwtServiceConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            issuer: "vetclinic".to_string(),
            access_token_lifetime: Duration::minutes(15),
            refresh_token_lifetime: Duration::days(7),
        }
    }
}

impl From<&JwtConfig> for JwtServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        let defaults = Self::default();
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            access_token_lifetime: lifetime_from_seconds(
                "JWT_ACCESS_TOKEN_EXPIRY",
                config.access_token_expiry,
                defaults.access_token_lifetime,
            ),
            refresh_token_lifetime: lifetime_from_seconds(
                "JWT_REFRESH_TOKEN_EXPIRY",
                config.refresh_token_expiry,
                defaults.refresh_token_lifetime,
            ),
        }
    }
}

impl std::fmt::Debug for JwtServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtServiceConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .finish()
    }
}
