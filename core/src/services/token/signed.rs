//! HMAC-signed claims tokens for access and refresh.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::{Claims, TokenClaims, TokenConfig, TokenKind};
use crate::errors::TokenError;

use super::traits::Token;

/// Algorithm used for every token this service signs
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted on verification; asymmetric and `none` are refused
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Compact JWT carrying [`Claims`]
pub struct SignedClaimsToken {
    kind: TokenKind,
    config: TokenConfig,
    secret: Vec<u8>,
    expires_at: Option<DateTime<Utc>>,
}

impl SignedClaimsToken {
    /// `secret` is the resolved signing key; the caller falls back to its
    /// default when the config carries none
    pub fn new(kind: TokenKind, config: TokenConfig, secret: Vec<u8>) -> Self {
        Self {
            kind,
            config,
            secret,
            expires_at: None,
        }
    }
}

impl std::fmt::Debug for SignedClaimsToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedClaimsToken")
            .field("kind", &self.kind)
            .field("config", &self.config)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Token for SignedClaimsToken {
    fn kind(&self) -> TokenKind {
        self.kind
    }

    fn generate(&mut self) -> Result<String, TokenError> {
        let claims = Claims::new(&self.config, self.kind, Utc::now(), self.config.lifetime)?;
        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::GenerationFailed {
            reason: format!("signing failed: {}", e),
        })?;

        self.expires_at = Some(claims.expires_at());
        Ok(token)
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = decode_signed(token, &self.secret, now)?;
        if claims.token_type != self.kind {
            return Err(TokenError::TypeMismatch {
                expected: self.kind,
                actual: claims.token_type,
            });
        }
        Ok(TokenClaims::Signed(claims))
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn check_format(&self, token: &str) -> Result<(), TokenError> {
        if token.is_empty() {
            return Err(TokenError::EmptyToken);
        }
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|part| part.is_empty()) {
            return Err(TokenError::InvalidTokenFormat);
        }
        Ok(())
    }
}

/// Verify a signed token and return its claims
///
/// Checks, in order: header parses, algorithm is HMAC, signature matches
/// `secret`, `exp` is after `now` (zero leeway), owner is present. The token
/// kind is left to the caller.
pub fn decode_signed(token: &str, secret: &[u8], now: DateTime<Utc>) -> Result<Claims, TokenError> {
    if token.is_empty() {
        return Err(TokenError::EmptyToken);
    }

    // `none` is not a recognised algorithm, so such headers fail to parse here
    let header = decode_header(token).map_err(|_| TokenError::InvalidTokenFormat)?;
    if !HMAC_ALGORITHMS.contains(&header.alg) {
        return Err(TokenError::UnexpectedAlgorithm {
            algorithm: format!("{:?}", header.alg),
        });
    }

    let mut validation = Validation::new(header.alg);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.leeway = 0;
    // Expiry is checked against the caller's clock below
    validation.validate_exp = false;
    validation.validate_aud = false;

    // Claims are read as raw JSON first so an unknown kind on a correctly
    // signed token is told apart from a malformed payload
    let data = decode::<serde_json::Value>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm {
                algorithm: format!("{:?}", header.alg),
            },
            ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim {
                claim: claim.clone(),
            },
            _ => TokenError::InvalidTokenFormat,
        })?;
    let claims = parse_claims(data.claims)?;

    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }
    if claims.user_id.is_empty() {
        return Err(TokenError::MissingClaim {
            claim: "user_id".to_string(),
        });
    }
    Ok(claims)
}

fn parse_claims(raw: serde_json::Value) -> Result<Claims, TokenError> {
    if let Some(kind) = raw.get("token_type").and_then(|kind| kind.as_str()) {
        if kind.parse::<TokenKind>().is_err() {
            return Err(TokenError::InvalidTokenType {
                kind: kind.to_string(),
            });
        }
    }
    serde_json::from_value(raw).map_err(|_| TokenError::InvalidTokenFormat)
}
