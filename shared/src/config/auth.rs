//! Authentication, token lifetime and session configuration

use serde::{Deserialize, Serialize};

/// Secret used when `JWT_SECRET` is not provided
pub const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// Default login session lifetime (30 days)
pub const DEFAULT_SESSION_LIFETIME_SECONDS: i64 = 30 * 24 * 60 * 60;

/// JWT signing configuration for access and refresh tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// HMAC secret used to sign tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604800,  // 7 days
            issuer: String::from("vetclinic"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Lifetimes of the store-backed token kinds, in seconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenLifetimeConfig {
    /// Account activation code lifetime
    #[serde(default = "default_activation_expiry")]
    pub activation_code_expiry: i64,

    /// Two-factor code lifetime
    #[serde(default = "default_two_factor_expiry")]
    pub two_factor_code_expiry: i64,

    /// OAuth2-style client secret lifetime
    #[serde(default = "default_oauth2_secret_expiry")]
    pub oauth2_secret_expiry: i64,
}

impl Default for TokenLifetimeConfig {
    fn default() -> Self {
        Self {
            activation_code_expiry: default_activation_expiry(),
            two_factor_code_expiry: default_two_factor_expiry(),
            oauth2_secret_expiry: default_oauth2_secret_expiry(),
        }
    }
}

/// Login session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds, applied as the store TTL
    #[serde(default = "default_session_lifetime")]
    pub lifetime: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: default_session_lifetime(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Store-backed token lifetimes
    #[serde(default)]
    pub tokens: TokenLifetimeConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_i64("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_i64("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        let tokens = TokenLifetimeConfig {
            activation_code_expiry: env_i64("ACTIVATION_CODE_EXPIRY", default_activation_expiry()),
            two_factor_code_expiry: env_i64("TWO_FACTOR_CODE_EXPIRY", default_two_factor_expiry()),
            oauth2_secret_expiry: env_i64("OAUTH2_SECRET_EXPIRY", default_oauth2_secret_expiry()),
        };

        let session = SessionConfig {
            lifetime: env_i64("SESSION_LIFETIME", default_session_lifetime()),
        };

        Self { jwt, tokens, session }
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_activation_expiry() -> i64 {
    600  // 10 minutes
}

fn default_two_factor_expiry() -> i64 {
    300  // 5 minutes
}

fn default_oauth2_secret_expiry() -> i64 {
    3600  // 1 hour
}

fn default_session_lifetime() -> i64 {
    DEFAULT_SESSION_LIFETIME_SECONDS
}
