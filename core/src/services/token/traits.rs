//! Uniform contract implemented by every token variant.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::entities::token::{TokenClaims, TokenKind};
use crate::errors::TokenError;

/// A token of one kind, owning its issuance parameters and, once generated,
/// its absolute expiry
pub trait Token: Send + Sync + fmt::Debug {
    fn kind(&self) -> TokenKind;

    /// Produce a fresh token string and record its expiry
    fn generate(&mut self) -> Result<String, TokenError>;

    /// Validate `token` as of `now`
    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;

    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Expiry of the last generated token; `None` before `generate`
    fn expires_at(&self) -> Option<DateTime<Utc>>;

    /// Never-generated tokens count as expired
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(true, |expires_at| now >= expires_at)
    }

    fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Cheap syntactic check, no signature or store involved
    fn check_format(&self, token: &str) -> Result<(), TokenError>;
}
