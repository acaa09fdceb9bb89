//! Token entities shared by the token variants, the signing service and the
//! stateful token store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

/// Closed set of token kinds issued by the clinic backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived signed token authorising API calls
    Access,
    /// Long-lived signed token exchanged for new access tokens
    Refresh,
    /// 6-digit code for second-factor confirmation
    TwoFactor,
    /// 8-digit code for account activation
    Activation,
    /// Random secret handed to OAuth2 clients
    #[serde(rename = "oauth2_secret")]
    Oauth2Secret,
}

impl TokenKind {
    /// All kinds, in declaration order
    pub const ALL: [TokenKind; 5] = [
        TokenKind::Access,
        TokenKind::Refresh,
        TokenKind::TwoFactor,
        TokenKind::Activation,
        TokenKind::Oauth2Secret,
    ];

    /// Canonical wire name, also used inside store keys
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::TwoFactor => "two_factor",
            TokenKind::Activation => "activation",
            TokenKind::Oauth2Secret => "oauth2_secret",
        }
    }

    /// Self-verifying kinds carry everything needed for validation in the
    /// token itself and never touch the store
    pub fn is_self_verifying(&self) -> bool {
        matches!(self, TokenKind::Access | TokenKind::Refresh)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TokenError::UnsupportedKind { kind: s.to_string() })
    }
}

/// Lifetime from a configured number of seconds
///
/// Values too large for a `Duration` fall back to `default` with a warning
/// naming `setting`.
pub fn lifetime_from_seconds(setting: &str, seconds: i64, default: Duration) -> Duration {
    Duration::try_seconds(seconds).unwrap_or_else(|| {
        tracing::warn!(
            setting = setting,
            seconds = seconds,
            "Configured lifetime is out of range, using the default"
        );
        default
    })
}

/// Issuance parameters for a single token
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub owner_id: String,
    pub purpose: String,
    pub lifetime: Duration,
    /// Empty means "use the factory default secret"
    pub signing_secret: Vec<u8>,
    pub issuer: String,
}

impl TokenConfig {
    /// Creates a config for `owner_id` with the given lifetime
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Identifier of the user the token is issued to
    /// * `lifetime` - How long the token stays valid after generation
    pub fn new(owner_id: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            owner_id: owner_id.into(),
            purpose: String::new(),
            lifetime,
            signing_secret: Vec::new(),
            issuer: String::new(),
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    pub fn with_signing_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.signing_secret = secret.into();
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Absolute expiry for a token generated at `now`
    pub(crate) fn expires_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, TokenError> {
        now.checked_add_signed(self.lifetime)
            .ok_or_else(|| TokenError::GenerationFailed {
                reason: "token lifetime is out of range".to_string(),
            })
    }

    /// Purpose as an optional claim value
    pub(crate) fn purpose_claim(&self) -> Option<String> {
        if self.purpose.is_empty() {
            None
        } else {
            Some(self.purpose.clone())
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("owner_id", &self.owner_id)
            .field("purpose", &self.purpose)
            .field("lifetime", &self.lifetime)
            .field("signing_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Wire claims embedded in signed access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Owner the token was issued to
    pub user_id: String,

    /// Token kind (`access` or `refresh`)
    pub token_type: TokenKind,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Subject, mirrors `user_id`
    pub sub: String,

    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Builds claims for `kind` valid from `issued_at` for `lifetime`
    ///
    /// `issued_at` is truncated to whole seconds first, so `exp - iat` is
    /// exactly the lifetime and the token expires at `iat + lifetime`.
    pub fn new(
        config: &TokenConfig,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let iat = issued_at.timestamp();
        let exp = DateTime::from_timestamp(iat, 0)
            .and_then(|issued| issued.checked_add_signed(lifetime))
            .map(|expires| expires.timestamp())
            .ok_or_else(|| TokenError::GenerationFailed {
                reason: "token lifetime is out of range".to_string(),
            })?;

        Ok(Self {
            user_id: config.owner_id.clone(),
            token_type: kind,
            iat,
            exp,
            purpose: config.purpose_claim(),
            sub: config.owner_id.clone(),
            iss: config.issuer.clone(),
        })
    }

    /// Issue time as a timestamp; out-of-range values clamp to the epoch
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Expiration as a timestamp; out-of-range values clamp to the epoch
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Expired once `now` reaches `exp`, with no leeway
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Claims for kinds validated without a signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalClaims {
    pub owner_id: String,
    pub kind: TokenKind,
    /// Unknown when rebuilt from a stored record
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub purpose: Option<String>,
}

/// Validation result, tagged by the family of token that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum TokenClaims {
    /// Access or refresh token claims
    Signed(Claims),
    /// Activation or two-factor code claims
    OneTimeCode(LocalClaims),
    /// OAuth2 secret claims
    Secret(LocalClaims),
}

impl TokenClaims {
    pub fn owner_id(&self) -> &str {
        match self {
            TokenClaims::Signed(claims) => &claims.user_id,
            TokenClaims::OneTimeCode(claims) | TokenClaims::Secret(claims) => &claims.owner_id,
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            TokenClaims::Signed(claims) => claims.token_type,
            TokenClaims::OneTimeCode(claims) | TokenClaims::Secret(claims) => claims.kind,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            TokenClaims::Signed(claims) => claims.expires_at(),
            TokenClaims::OneTimeCode(claims) | TokenClaims::Secret(claims) => claims.expires_at,
        }
    }

    pub fn purpose(&self) -> Option<&str> {
        match self {
            TokenClaims::Signed(claims) => claims.purpose.as_deref(),
            TokenClaims::OneTimeCode(claims) | TokenClaims::Secret(claims) => {
                claims.purpose.as_deref()
            }
        }
    }

    /// Signed claims, if this came from an access or refresh token
    pub fn as_signed(&self) -> Option<&Claims> {
        match self {
            TokenClaims::Signed(claims) => Some(claims),
            _ => None,
        }
    }

    /// Wraps local claims in the variant matching their kind
    pub(crate) fn local(claims: LocalClaims) -> Self {
        match claims.kind {
            TokenKind::Oauth2Secret => TokenClaims::Secret(claims),
            _ => TokenClaims::OneTimeCode(claims),
        }
    }
}

/// Persisted record of a store-backed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token_string: String,
    pub token_type: TokenKind,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Expired once `now` reaches `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Claims rebuilt from the record; issue time and purpose are not stored
    pub fn to_claims(&self) -> TokenClaims {
        TokenClaims::local(LocalClaims {
            owner_id: self.user_id.clone(),
            kind: self.token_type,
            issued_at: None,
            expires_at: self.expires_at,
            purpose: None,
        })
    }
}

/// Access and refresh tokens issued together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}
