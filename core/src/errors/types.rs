//! Token and store error types
//!
//! Messages are plain English; the presentation layer decides what reaches
//! the client. Every variant maps to a stable error code and a category so
//! callers can branch on the failure class without matching every variant.

use thiserror::Error;

use crate::domain::entities::token::TokenKind;

/// Coarse classification of token failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Random source or signing step failed
    Generation,
    /// Kind outside the enumerated set
    UnsupportedKind,
    /// Empty owner, malformed header, empty token string
    MalformedInput,
    /// Local expiry check failed
    Expired,
    /// Presented one-time code differs from the issued one
    Mismatch,
    /// Parse or signature verification failed, including algorithm confusion
    SignatureOrFormat,
    /// Kind embedded in the token is not the one asked for
    TypeMismatch,
    /// No matching stored entry
    NotFound,
}

/// Token issuance and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token generation failed: {reason}")]
    GenerationFailed { reason: String },

    #[error("Unsupported token kind: {kind}")]
    UnsupportedKind { kind: String },

    #[error("Owner ID must not be empty")]
    MissingOwner,

    #[error("Malformed authorization header: {reason}")]
    MalformedHeader { reason: String },

    #[error("Token string must not be empty")]
    EmptyToken,

    #[error("Token expired")]
    Expired,

    #[error("Token does not match the issued value")]
    CodeMismatch,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unexpected signing algorithm: {algorithm}")]
    UnexpectedAlgorithm { algorithm: String },

    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },

    #[error("Token kind {kind} is not accepted here")]
    InvalidTokenType { kind: String },

    #[error("Expected {expected} token, got {actual}")]
    TypeMismatch { expected: TokenKind, actual: TokenKind },

    #[error("Token not found")]
    NotFound,
}

impl TokenError {
    /// Failure class of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            TokenError::GenerationFailed { .. } => ErrorCategory::Generation,
            TokenError::UnsupportedKind { .. } => ErrorCategory::UnsupportedKind,
            TokenError::MissingOwner
            | TokenError::MalformedHeader { .. }
            | TokenError::EmptyToken => ErrorCategory::MalformedInput,
            TokenError::Expired => ErrorCategory::Expired,
            TokenError::CodeMismatch => ErrorCategory::Mismatch,
            TokenError::InvalidTokenFormat
            | TokenError::InvalidSignature
            | TokenError::UnexpectedAlgorithm { .. }
            | TokenError::MissingClaim { .. } => ErrorCategory::SignatureOrFormat,
            TokenError::InvalidTokenType { .. } | TokenError::TypeMismatch { .. } => {
                ErrorCategory::TypeMismatch
            }
            TokenError::NotFound => ErrorCategory::NotFound,
        }
    }

    /// Stable error code for API responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::GenerationFailed { .. } => "TOKEN_GENERATION_FAILED",
            TokenError::UnsupportedKind { .. } => "UNSUPPORTED_TOKEN_KIND",
            TokenError::MissingOwner => "MISSING_OWNER",
            TokenError::MalformedHeader { .. } => "MALFORMED_AUTHORIZATION_HEADER",
            TokenError::EmptyToken => "EMPTY_TOKEN",
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::CodeMismatch => "TOKEN_MISMATCH",
            TokenError::InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::UnexpectedAlgorithm { .. } => "UNEXPECTED_ALGORITHM",
            TokenError::MissingClaim { .. } => "MISSING_CLAIM",
            TokenError::InvalidTokenType { .. } => "INVALID_TOKEN_TYPE",
            TokenError::TypeMismatch { .. } => "TOKEN_TYPE_MISMATCH",
            TokenError::NotFound => "TOKEN_NOT_FOUND",
        }
    }

    /// Whether this error means the presented credential is unusable, as
    /// opposed to a caller or server fault
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::Generation | ErrorCategory::UnsupportedKind
        )
    }
}

/// Key-value store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network or protocol failure talking to the store
    #[error("Store transport error: {message}")]
    Transport { message: String },

    /// A persisted value could not be encoded or decoded
    #[error("Store serialization error: {message}")]
    Serialization { message: String },
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        StoreError::Transport {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}
