//! Numeric one-time codes for account activation and two-factor confirmation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;

use crate::domain::entities::token::{LocalClaims, TokenClaims, TokenConfig, TokenKind};
use crate::errors::TokenError;

use super::random::{uniform_below, SecureRandom};
use super::traits::Token;

/// Digits in an activation code
pub const ACTIVATION_CODE_DIGITS: u32 = 8;

/// Digits in a two-factor code
pub const TWO_FACTOR_CODE_DIGITS: u32 = 6;

/// Zero-padded decimal code drawn uniformly from `[0, 10^digits)`
#[derive(Debug)]
pub struct NumericCodeToken {
    kind: TokenKind,
    digits: u32,
    config: TokenConfig,
    random: Arc<dyn SecureRandom>,
    code: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl NumericCodeToken {
    pub fn new(kind: TokenKind, config: TokenConfig, random: Arc<dyn SecureRandom>) -> Self {
        let digits = match kind {
            TokenKind::TwoFactor => TWO_FACTOR_CODE_DIGITS,
            _ => ACTIVATION_CODE_DIGITS,
        };
        Self {
            kind,
            digits,
            config,
            random,
            code: None,
            expires_at: None,
        }
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }
}

impl Token for NumericCodeToken {
    fn kind(&self) -> TokenKind {
        self.kind
    }

    fn generate(&mut self) -> Result<String, TokenError> {
        let expires_at = self.config.expires_after(Utc::now())?;
        let value = uniform_below(self.random.as_ref(), 10u32.pow(self.digits))?;
        let code = format!("{:0width$}", value, width = self.digits as usize);

        self.expires_at = Some(expires_at);
        self.code = Some(code.clone());
        Ok(code)
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::EmptyToken);
        }
        let expires_at = match self.expires_at {
            Some(expires_at) if now < expires_at => expires_at,
            _ => return Err(TokenError::Expired),
        };
        let code = self.code.as_deref().unwrap_or_default();
        if !constant_time_eq(code.as_bytes(), token.as_bytes()) {
            return Err(TokenError::CodeMismatch);
        }

        Ok(TokenClaims::OneTimeCode(LocalClaims {
            owner_id: self.config.owner_id.clone(),
            kind: self.kind,
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
        if token.len() != self.digits as usize || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenError::InvalidTokenFormat);
        }
        Ok(())
    }
}
