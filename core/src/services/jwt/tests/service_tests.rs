//! Unit tests for the signing service

use chrono::{Duration, Utc};

use crate::domain::entities::token::{TokenConfig, TokenKind};
use crate::errors::TokenError;
use crate::services::jwt::{JwtService, JwtServiceConfig};
use crate::services::token::TokenFactory;

fn service() -> JwtService {
    JwtService::new(JwtServiceConfig {
        secret: "unit-test-signing-secret".to_string(),
        issuer: "vetclinic-test".to_string(),
        access_token_lifetime: Duration::minutes(15),
        refresh_token_lifetime: Duration::days(7),
    })
}

#[test]
fn test_access_token_carries_owner_and_issuer() {
    let service = service();
    let token = service.generate_access_token("owner-42").unwrap();

    let claims = service.validate_access_token(&token).unwrap();
    assert_eq!(claims.user_id, "owner-42");
    assert_eq!(claims.sub, "owner-42");
    assert_eq!(claims.iss, "vetclinic-test");
    assert_eq!(claims.token_type, TokenKind::Access);
    assert_eq!(claims.exp - claims.iat, 15 * 60);
}

#[test]
fn test_empty_owner_is_rejected() {
    let service = service();

    for result in [
        service.generate_access_token(""),
        service.generate_refresh_token(""),
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.token_error(), Some(&TokenError::MissingOwner));
    }
    assert_eq!(
        service.generate_token_pair("").unwrap_err().token_error(),
        Some(&TokenError::MissingOwner)
    );
}

#[test]
fn test_token_pair_kinds_are_enforced() {
    let service = service();
    let pair = service.generate_token_pair("owner-1").unwrap();

    assert_eq!(pair.access_expires_in, 900);
    assert_eq!(pair.refresh_expires_in, 7 * 24 * 3600);
    assert!(service.validate_access_token(&pair.access_token).is_ok());
    assert!(service.validate_refresh_token(&pair.refresh_token).is_ok());

    let err = service.validate_access_token(&pair.refresh_token).unwrap_err();
    assert_eq!(
        err.token_error(),
        Some(&TokenError::TypeMismatch {
            expected: TokenKind::Access,
            actual: TokenKind::Refresh,
        })
    );

    let err = service.validate_refresh_token(&pair.access_token).unwrap_err();
    assert_eq!(
        err.token_error(),
        Some(&TokenError::TypeMismatch {
            expected: TokenKind::Refresh,
            actual: TokenKind::Access,
        })
    );
}

#[test]
fn test_validate_token_accepts_both_signed_kinds() {
    let service = service();
    let pair = service.generate_token_pair("owner-1").unwrap();

    assert_eq!(service.validate_token(&pair.access_token).unwrap().token_type, TokenKind::Access);
    assert_eq!(service.validate_token(&pair.refresh_token).unwrap().token_type, TokenKind::Refresh);
}

#[test]
fn test_validate_token_rejects_signed_store_backed_kind() {
    let service = service();
    // Same secret, but a kind the signing service never issues
    let factory = TokenFactory::new("unit-test-signing-secret");
    let mut access = factory
        .create_token(TokenKind::Access, TokenConfig::new("owner-1", Duration::minutes(5)))
        .unwrap();
    let value = access.generate().unwrap();
    assert!(service.validate_token(&value).is_ok());

    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &serde_json::json!({
            "user_id": "owner-1",
            "token_type": "activation",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 300,
            "sub": "owner-1",
            "iss": "vetclinic-test",
        }),
        &jsonwebtoken::EncodingKey::from_secret(b"unit-test-signing-secret"),
    )
    .unwrap();

    assert_eq!(
        service.validate_token(&forged).unwrap_err().token_error(),
        Some(&TokenError::InvalidTokenType {
            kind: "activation".to_string()
        })
    );
}

#[test]
fn test_token_from_other_secret_is_invalid_signature() {
    let other = JwtService::new(JwtServiceConfig {
        secret: "a-different-secret".to_string(),
        ..JwtServiceConfig::default()
    });
    let token = other.generate_access_token("owner-1").unwrap();

    let err = service().validate_access_token(&token).unwrap_err();
    assert_eq!(err.token_error(), Some(&TokenError::InvalidSignature));
    assert!(err.is_unauthenticated());
}

#[test]
fn test_refresh_exchange_keeps_owner() {
    let service = service();
    let pair = service.generate_token_pair("owner-7").unwrap();

    let access = service.refresh_access_token(&pair.refresh_token).unwrap();
    assert_eq!(service.validate_access_token(&access).unwrap().user_id, "owner-7");

    // The refresh token is not consumed by the exchange
    assert!(service.validate_refresh_token(&pair.refresh_token).is_ok());
}

#[test]
fn test_refresh_exchange_rejects_access_token() {
    let service = service();
    let pair = service.generate_token_pair("owner-7").unwrap();

    let err = service.refresh_access_token(&pair.access_token).unwrap_err();
    assert!(matches!(err.token_error(), Some(TokenError::TypeMismatch { .. })));
}

#[test]
fn test_is_token_expired_distinguishes_expiry_from_invalidity() {
    let service = service();
    let token = service.generate_access_token("owner-1").unwrap();
    let now = Utc::now();

    assert!(!service.is_token_expired(&token).unwrap());
    assert!(service.is_token_expired_at(&token, now + Duration::minutes(16)).unwrap());

    let err = service.is_token_expired("garbage").unwrap_err();
    assert_eq!(err.token_error(), Some(&TokenError::InvalidTokenFormat));
}

#[test]
fn test_remaining_time() {
    let service = service();
    let token = service.generate_access_token("owner-1").unwrap();
    let claims = service.validate_access_token(&token).unwrap();
    let issued_at = chrono::DateTime::from_timestamp(claims.iat, 0).unwrap();

    assert_eq!(
        service.token_remaining_time_at(&token, issued_at + Duration::minutes(5)).unwrap(),
        Duration::minutes(10)
    );
    assert_eq!(
        service.token_remaining_time_at(&token, issued_at + Duration::minutes(20)).unwrap(),
        Duration::zero()
    );
    assert!(service.token_remaining_time("a.b.c").is_err());
}

#[test]
fn test_errors_carry_operation_context() {
    let service = service();
    let err = service.validate_access_token("").unwrap_err();

    assert!(err.to_string().starts_with("validate access token"));
    assert_eq!(err.token_error(), Some(&TokenError::EmptyToken));
}
