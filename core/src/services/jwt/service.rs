//! Signing service for access and refresh tokens

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::token::{Claims, TokenClaims, TokenConfig, TokenKind, TokenPair};
use crate::errors::{DomainResult, ResultExt, TokenError};
use crate::services::token::{decode_signed, TokenFactory};

use super::config::JwtServiceConfig;

/// Issues and verifies self-verifying tokens
///
/// A thin layer over [`TokenFactory`]: it fills in the configured secret,
/// issuer and lifetimes, and narrows validation to one kind at a time. Holds
/// no mutable state.
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtServiceConfig,
    factory: TokenFactory,
}

impl JwtService {
    /// Creates a new signing service
    ///
    /// # Arguments
    ///
    /// * `config` - Secret, issuer and lifetimes
    pub fn new(config: JwtServiceConfig) -> Self {
        let factory = TokenFactory::new(config.secret.as_bytes());
        Self { config, factory }
    }

    pub fn config(&self) -> &JwtServiceConfig {
        &self.config
    }

    /// Generates an access token for `owner_id`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Compact signed token
    /// * `Err(DomainError)` - `MissingOwner` for an empty owner, or a signing failure
    pub fn generate_access_token(&self, owner_id: &str) -> DomainResult<String> {
        self.generate(TokenKind::Access, owner_id, self.config.access_token_lifetime)
            .context("generate access token")
    }

    /// Generates a refresh token for `owner_id`
    pub fn generate_refresh_token(&self, owner_id: &str) -> DomainResult<String> {
        self.generate(TokenKind::Refresh, owner_id, self.config.refresh_token_lifetime)
            .context("generate refresh token")
    }

    /// Generates an access and refresh token, stopping at the first failure
    pub fn generate_token_pair(&self, owner_id: &str) -> DomainResult<TokenPair> {
        let access_token = self.generate_access_token(owner_id)?;
        let refresh_token = self.generate_refresh_token(owner_id)?;

        tracing::info!(
            owner_id = owner_id,
            event = "token_pair_issued",
            "Issued access and refresh tokens"
        );

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_lifetime.num_seconds(),
            self.config.refresh_token_lifetime.num_seconds(),
        ))
    }

    fn generate(&self, kind: TokenKind, owner_id: &str, lifetime: Duration) -> Result<String, TokenError> {
        if owner_id.is_empty() {
            return Err(TokenError::MissingOwner);
        }
        let config = TokenConfig::new(owner_id, lifetime).with_issuer(self.config.issuer.clone());
        let mut token = self.factory.create_token(kind, config)?;
        token.generate()
    }

    /// Extracts the token from an `Authorization: Bearer <token>` header value
    ///
    /// The value must split on a single space into exactly two parts, the
    /// scheme is matched case-insensitively, and the token must not be blank.
    pub fn extract_token(header: &str) -> Result<&str, TokenError> {
        let malformed = |reason: &str| TokenError::MalformedHeader {
            reason: reason.to_string(),
        };

        if header.trim().is_empty() {
            return Err(malformed("header is empty"));
        }
        let parts: Vec<&str> = header.split(' ').collect();
        if parts.len() != 2 {
            return Err(malformed("expected `Bearer <token>`"));
        }
        if !parts[0].eq_ignore_ascii_case("bearer") {
            return Err(malformed("unsupported authorization scheme"));
        }
        let token = parts[1].trim();
        if token.is_empty() {
            return Err(malformed("token is empty"));
        }
        Ok(token)
    }

    /// Validates a token of either signed kind
    pub fn validate_token(&self, token: &str) -> DomainResult<Claims> {
        self.validate_token_at(token, Utc::now())
    }

    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> DomainResult<Claims> {
        let result = decode_signed(token, self.config.secret.as_bytes(), now).and_then(|claims| {
            if claims.token_type.is_self_verifying() {
                Ok(claims)
            } else {
                Err(TokenError::InvalidTokenType {
                    kind: claims.token_type.to_string(),
                })
            }
        });
        Self::log_rejection(&result, "any");
        result.context("validate token")
    }

    /// Validates an access token; a refresh token yields `TypeMismatch`
    pub fn validate_access_token(&self, token: &str) -> DomainResult<Claims> {
        self.validate_kind_at(TokenKind::Access, token, Utc::now())
            .context("validate access token")
    }

    /// Validates a refresh token; an access token yields `TypeMismatch`
    pub fn validate_refresh_token(&self, token: &str) -> DomainResult<Claims> {
        self.validate_kind_at(TokenKind::Refresh, token, Utc::now())
            .context("validate refresh token")
    }

    fn validate_kind_at(
        &self,
        kind: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let result = self
            .factory
            .validator(kind)
            .and_then(|validator| validator.validate_at(token, now))
            .and_then(|claims| match claims {
                TokenClaims::Signed(claims) => Ok(claims),
                other => Err(TokenError::InvalidTokenType {
                    kind: other.kind().to_string(),
                }),
            });
        Self::log_rejection(&result, kind.as_str());
        result
    }

    /// Mints a new access token for the owner of a valid refresh token
    ///
    /// The refresh token stays valid; rotation is the caller's decision.
    pub fn refresh_access_token(&self, refresh_token: &str) -> DomainResult<String> {
        let claims = self.validate_refresh_token(refresh_token)?;
        let access_token = self.generate_access_token(&claims.user_id)?;

        tracing::info!(
            owner_id = %claims.user_id,
            event = "access_token_refreshed",
            "Exchanged refresh token for a new access token"
        );
        Ok(access_token)
    }

    /// `Ok(true)` only when the token is genuine but past its expiry; every
    /// other validation failure is returned as an error
    pub fn is_token_expired(&self, token: &str) -> DomainResult<bool> {
        self.is_token_expired_at(token, Utc::now())
    }

    pub fn is_token_expired_at(&self, token: &str, now: DateTime<Utc>) -> DomainResult<bool> {
        match self.validate_token_at(token, now) {
            Ok(_) => Ok(false),
            Err(err) if err.token_error() == Some(&TokenError::Expired) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Time left before expiry; zero once expired, error for invalid tokens
    pub fn token_remaining_time(&self, token: &str) -> DomainResult<Duration> {
        self.token_remaining_time_at(token, Utc::now())
    }

    pub fn token_remaining_time_at(&self, token: &str, now: DateTime<Utc>) -> DomainResult<Duration> {
        match self.validate_token_at(token, now) {
            Ok(claims) => Ok(claims.expires_at() - now),
            Err(err) if err.token_error() == Some(&TokenError::Expired) => Ok(Duration::zero()),
            Err(err) => Err(err),
        }
    }

    fn log_rejection<T>(result: &Result<T, TokenError>, expected: &str) {
        if let Err(err) = result {
            tracing::warn!(
                expected_kind = expected,
                error_code = err.code(),
                event = "token_rejected",
                "Rejected signed token"
            );
        }
    }
}
