//! Maps a token kind to the variant that implements it.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::entities::token::{TokenConfig, TokenKind};
use crate::errors::TokenError;

use super::one_time_code::NumericCodeToken;
use super::random::{OsRandom, SecureRandom};
use super::secret::RandomSecretToken;
use super::signed::SignedClaimsToken;
use super::traits::Token;

/// Stateless token factory
///
/// Holds only the default signing secret and the random source, so one
/// instance can be shared across tasks behind an `Arc`.
#[derive(Clone)]
pub struct TokenFactory {
    default_secret: Vec<u8>,
    random: Arc<dyn SecureRandom>,
}

impl TokenFactory {
    /// Creates a factory backed by the OS random source
    ///
    /// # Arguments
    ///
    /// * `default_secret` - Signing secret used when a config carries none
    pub fn new(default_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            default_secret: default_secret.into(),
            random: Arc::new(OsRandom),
        }
    }

    /// Replaces the random source
    pub fn with_random(mut self, random: Arc<dyn SecureRandom>) -> Self {
        self.random = random;
        self
    }

    /// Creates a token of `kind` configured by `config`
    ///
    /// # Returns
    ///
    /// * `Ok(Box<dyn Token>)` - Ungenerated token; call `generate` to mint a value
    pub fn create_token(
        &self,
        kind: TokenKind,
        config: TokenConfig,
    ) -> Result<Box<dyn Token>, TokenError> {
        let token: Box<dyn Token> = match kind {
            TokenKind::Access | TokenKind::Refresh => {
                let secret = if config.signing_secret.is_empty() {
                    self.default_secret.clone()
                } else {
                    config.signing_secret.clone()
                };
                Box::new(SignedClaimsToken::new(kind, config, secret))
            }
            TokenKind::Activation | TokenKind::TwoFactor => {
                Box::new(NumericCodeToken::new(kind, config, self.random.clone()))
            }
            TokenKind::Oauth2Secret => {
                Box::new(RandomSecretToken::new(config, self.random.clone()))
            }
        };
        Ok(token)
    }

    /// Same as [`create_token`](Self::create_token) for a kind given by name
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::UnsupportedKind)` - Name outside the known kinds
    pub fn create_token_from_name(
        &self,
        kind: &str,
        config: TokenConfig,
    ) -> Result<Box<dyn Token>, TokenError> {
        let kind = kind.parse::<TokenKind>()?;
        self.create_token(kind, config)
    }

    /// Config-less variant of `kind` for validation and format checks
    pub fn validator(&self, kind: TokenKind) -> Result<Box<dyn Token>, TokenError> {
        self.create_token(kind, TokenConfig::new(String::new(), Duration::zero()))
    }
}

impl std::fmt::Debug for TokenFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFactory")
            .field("random", &self.random)
            .finish_non_exhaustive()
    }
}
