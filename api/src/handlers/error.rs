//! Conversion of domain errors into HTTP responses
//!
//! Authentication failures become 401, missing sessions 404, store outages
//! 503 so they are never mistaken for a revoked token, and everything else
//! 500. The body is always the shared `ErrorResponse`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use vc_core::errors::{DomainError, TokenError};
use vc_shared::errors::{error_codes, ErrorResponse};

/// Error returned by handlers and the authentication middleware
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError(DomainError::Token(err))
    }
}

impl ApiError {
    /// Error code reported to the client
    fn error_code(&self) -> &'static str {
        if let Some(token_error) = self.0.token_error() {
            if token_error.is_rejection() {
                return token_error.code();
            }
        }
        match self.status_code() {
            StatusCode::UNAUTHORIZED => error_codes::UNAUTHORIZED,
            StatusCode::NOT_FOUND => error_codes::NOT_FOUND,
            StatusCode::BAD_REQUEST => error_codes::BAD_REQUEST,
            StatusCode::SERVICE_UNAVAILABLE => error_codes::SERVICE_UNAVAILABLE,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    /// Response body, with the token kinds involved in a kind mismatch
    fn body(&self) -> ErrorResponse {
        let body = ErrorResponse::new(self.error_code(), self.message());
        match self.0.token_error() {
            Some(TokenError::TypeMismatch { expected, actual }) => body
                .add_detail("expected_kind", expected.as_str())
                .add_detail("actual_kind", actual.as_str()),
            Some(TokenError::InvalidTokenType { kind }) => body.add_detail("kind", kind),
            _ => body,
        }
    }

    /// Client-facing message; internal failures are not described
    fn message(&self) -> String {
        match self.status_code() {
            StatusCode::SERVICE_UNAVAILABLE => {
                "Service temporarily unavailable, please retry".to_string()
            }
            StatusCode::INTERNAL_SERVER_ERROR => "An internal error occurred".to_string(),
            _ => self.0.root().to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        let err = &self.0;
        if err.is_unauthenticated() {
            StatusCode::UNAUTHORIZED
        } else if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else if err.is_transient() {
            StatusCode::SERVICE_UNAVAILABLE
        } else if matches!(err.root(), DomainError::Validation { .. }) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }

        HttpResponse::build(status).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_core::domain::entities::token::TokenKind;
    use vc_core::errors::StoreError;

    fn wrapped(err: impl Into<DomainError>) -> ApiError {
        ApiError(err.into().context("handle request"))
    }

    #[test]
    fn test_token_rejections_are_unauthorized() {
        for err in [
            TokenError::Expired,
            TokenError::InvalidSignature,
            TokenError::NotFound,
            TokenError::EmptyToken,
        ] {
            let api_error = wrapped(err.clone());
            assert_eq!(api_error.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(api_error.error_code(), err.code());
        }
    }

    #[test]
    fn test_missing_session_is_not_found() {
        let api_error = wrapped(DomainError::NotFound {
            resource: "session abc".to_string(),
        });
        assert_eq!(api_error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api_error.error_code(), error_codes::NOT_FOUND);
    }

    #[test]
    fn test_store_outage_is_service_unavailable() {
        let api_error = wrapped(StoreError::transport("connection refused"));
        assert_eq!(api_error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api_error.error_code(), error_codes::SERVICE_UNAVAILABLE);
        assert!(!api_error.message().contains("connection refused"));
    }

    #[test]
    fn test_generation_failure_is_internal() {
        let api_error = wrapped(TokenError::GenerationFailed {
            reason: "entropy source unavailable".to_string(),
        });
        assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error_code(), error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_kind_mismatch_details_name_both_kinds() {
        let body = wrapped(TokenError::TypeMismatch {
            expected: TokenKind::Access,
            actual: TokenKind::Refresh,
        })
        .body();
        let details = body.details.unwrap();
        assert_eq!(details["expected_kind"], "access");
        assert_eq!(details["actual_kind"], "refresh");

        let body = wrapped(TokenError::InvalidTokenType {
            kind: "password_reset".to_string(),
        })
        .body();
        assert_eq!(body.details.unwrap()["kind"], "password_reset");
    }

    #[test]
    fn test_other_errors_carry_no_details() {
        assert!(wrapped(TokenError::Expired).body().details.is_none());
    }

    #[test]
    fn test_validation_is_bad_request() {
        let api_error = wrapped(DomainError::Validation {
            message: "Session requires an owner and an id".to_string(),
        });
        assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);
    }
}
