//! Random-secret tokens handed to OAuth2 clients.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

use crate::domain::entities::token::{LocalClaims, TokenClaims, TokenConfig, TokenKind};
use crate::errors::TokenError;

use super::random::SecureRandom;
use super::traits::Token;

/// Random bytes drawn per secret
const SECRET_BYTES: usize = 32;

/// Hex length of a SHA-256 digest
pub const SECRET_HEX_LENGTH: usize = 64;

/// Hex-encoded SHA-256 of fresh random bytes
#[derive(Debug)]
pub struct RandomSecretToken {
    config: TokenConfig,
    random: Arc<dyn SecureRandom>,
    secret: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl RandomSecretToken {
    pub fn new(config: TokenConfig, random: Arc<dyn SecureRandom>) -> Self {
        Self {
            config,
            random,
            secret: None,
            expires_at: None,
        }
    }
}

impl Token for RandomSecretToken {
    fn kind(&self) -> TokenKind {
        TokenKind::Oauth2Secret
    }

    fn generate(&mut self) -> Result<String, TokenError> {
        let expires_at = self.config.expires_after(Utc::now())?;
        let mut bytes = [0u8; SECRET_BYTES];
        self.random.fill(&mut bytes)?;
        let secret = hex::encode(Sha256::digest(bytes));

        self.expires_at = Some(expires_at);
        self.secret = Some(secret.clone());
        Ok(secret)
    }

    /// Local validation covers format and expiry. When this instance issued
    /// the secret, the presented value must also match it.
    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        self.check_format(token)?;
        let expires_at = match self.expires_at {
            Some(expires_at) if now < expires_at => expires_at,
            _ => return Err(TokenError::Expired),
        };
        if let Some(secret) = &self.secret {
            if !constant_time_eq(secret.as_bytes(), token.as_bytes()) {
                return Err(TokenError::CodeMismatch);
            }
        }

        Ok(TokenClaims::Secret(LocalClaims {
            owner_id: self.config.owner_id.clone(),
            kind: TokenKind::Oauth2Secret,
            issued_at: Some(expires_at - self.config.lifetime),
            expires_at,
            purpose: self.config.purpose_claim(),
        }))
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn check_format(&self, token: &str) -> Result<(), TokenError> {
        if token.is_empty() {
            return Err(TokenError::EmptyToken);
        }
        if token.len() != SECRET_HEX_LENGTH || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TokenError::InvalidTokenFormat);
        }
        Ok(())
    }
}
