//! Domain-specific error types and error handling.

mod types;

pub use types::{ErrorCategory, StoreError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Lower-level failure annotated with the operation that hit it
    #[error("{operation}: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<DomainError>,
    },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Wrap this error with the operation (and token kind) that produced it
    pub fn context(self, operation: impl Into<String>) -> Self {
        DomainError::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error beneath any context wrappers
    pub fn root(&self) -> &DomainError {
        match self {
            DomainError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Token error at the root, if any
    pub fn token_error(&self) -> Option<&TokenError> {
        match self.root() {
            DomainError::Token(err) => Some(err),
            _ => None,
        }
    }

    /// Store error at the root, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        match self.root() {
            DomainError::Store(err) => Some(err),
            _ => None,
        }
    }

    /// True for store outages, which must not be reported as revoked sessions
    pub fn is_transient(&self) -> bool {
        matches!(self.store_error(), Some(StoreError::Transport { .. }))
    }

    /// True when the presented token should yield 401
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self.token_error(), Some(err) if err.is_rejection())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), DomainError::NotFound { .. })
    }
}

/// Adds operation context to any error convertible into [`DomainError`]
pub trait ResultExt<T> {
    fn context(self, operation: impl Into<String>) -> DomainResult<T>;

    fn with_context<F, S>(self, operation: F) -> DomainResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<DomainError>,
{
    fn context(self, operation: impl Into<String>) -> DomainResult<T> {
        self.map_err(|err| err.into().context(operation))
    }

    fn with_context<F, S>(self, operation: F) -> DomainResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|err| err.into().context(operation()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_root_token_error() {
        let result: Result<(), TokenError> = Err(TokenError::Expired);
        let err = result
            .context("validate activation token")
            .context("activate account")
            .unwrap_err();

        assert_eq!(err.token_error(), Some(&TokenError::Expired));
        assert!(err.is_unauthenticated());
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "activate account: validate activation token: Token expired"
        );
    }

    #[test]
    fn test_transport_failure_is_transient_not_unauthenticated() {
        let err = DomainError::from(StoreError::transport("connection reset"))
            .context("validate session");

        assert!(err.is_transient());
        assert!(!err.is_unauthenticated());
        assert!(err.token_error().is_none());
    }

    #[test]
    fn test_missing_resource_is_not_an_auth_failure() {
        let err = DomainError::NotFound { resource: "session".into() }.context("get session");
        assert!(err.is_not_found());
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn test_serialization_failure_is_not_transient() {
        let err = DomainError::from(StoreError::Serialization { message: "bad json".into() });
        assert!(!err.is_transient());
    }
}
