//! Default lifetime per token kind

use chrono::Duration;
use vc_shared::AuthConfig;

use crate::domain::entities::token::{lifetime_from_seconds, TokenKind};

/// Lifetime applied to each kind when the caller does not pick one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub activation: Duration,
    pub two_factor: Duration,
    pub oauth2_secret: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            activation: Duration::minutes(10),
            two_factor: Duration::minutes(5),
            oauth2_secret: Duration::hours(1),
        }
    }
}

impl TokenLifetimes {
    /// Reads JWT expiries and store-backed token expiries from `config`
    pub fn from_config(config: &AuthConfig) -> Self {
        let defaults = Self::default();
        Self {
            access: lifetime_from_seconds(
                "JWT_ACCESS_TOKEN_EXPIRY",
                config.jwt.access_token_expiry,
                defaults.access,
            ),
            refresh: lifetime_from_seconds(
                "JWT_REFRESH_TOKEN_EXPIRY",
                config.jwt.refresh_token_expiry,
                defaults.refresh,
            ),
            activation: lifetime_from_seconds(
                "ACTIVATION_CODE_EXPIRY",
                config.tokens.activation_code_expiry,
                defaults.activation,
            ),
            two_factor: lifetime_from_seconds(
                "TWO_FACTOR_CODE_EXPIRY",
                config.tokens.two_factor_code_expiry,
                defaults.two_factor,
            ),
            oauth2_secret: lifetime_from_seconds(
                "OAUTH2_SECRET_EXPIRY",
                config.tokens.oauth2_secret_expiry,
                defaults.oauth2_secret,
            ),
        }
    }

    pub fn for_kind(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
            TokenKind::Activation => self.activation,
            TokenKind::TwoFactor => self.two_factor,
            TokenKind::Oauth2Secret => self.oauth2_secret,
        }
    }
}
