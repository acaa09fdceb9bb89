//! End-to-end token flows against the in-memory store

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};

use vc_core::{
    JwtService, JwtServiceConfig, KeyValueStore, MemoryKeyValueStore, TokenConfig, TokenError,
    TokenFactory, TokenKind, TokenManager,
};

const SECRET: &str = "integration-signing-secret";

fn manager() -> (TokenManager<Arc<MemoryKeyValueStore>>, Arc<MemoryKeyValueStore>) {
    let store = Arc::new(MemoryKeyValueStore::new());
    let manager = TokenManager::new(store.clone(), TokenFactory::new(SECRET));
    (manager, store)
}

fn jwt_service() -> JwtService {
    JwtService::new(JwtServiceConfig {
        secret: SECRET.to_string(),
        ..JwtServiceConfig::default()
    })
}

#[tokio::test]
async fn activation_code_expires_after_its_lifetime() {
    let (manager, _store) = manager();
    let config = TokenConfig::new("owner-a", Duration::minutes(10)).with_purpose("activate_account");

    let code = manager.generate_token(TokenKind::Activation, config).await.unwrap();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let claims = manager
        .validate_token("owner-a", &code, TokenKind::Activation)
        .await
        .unwrap();
    assert_eq!(claims.owner_id(), "owner-a");
    assert_eq!(claims.kind(), TokenKind::Activation);

    let later = Utc::now() + Duration::minutes(11);
    let err = manager
        .validate_token_at("owner-a", &code, TokenKind::Activation, later)
        .await
        .unwrap_err();
    assert_eq!(err.token_error(), Some(&TokenError::Expired));
}

#[tokio::test]
async fn access_and_refresh_tokens_are_not_interchangeable() {
    let jwt = jwt_service();
    let pair = jwt.generate_token_pair("owner-b").unwrap();

    let err = jwt.validate_access_token(&pair.refresh_token).unwrap_err();
    assert!(matches!(err.token_error(), Some(TokenError::TypeMismatch { .. })));
    assert!(err.is_unauthenticated());

    let claims = jwt.validate_refresh_token(&pair.refresh_token).unwrap();
    assert_eq!(claims.user_id, "owner-b");
    assert_eq!(claims.token_type, TokenKind::Refresh);
}

#[tokio::test]
async fn invalidate_all_removes_every_code_and_the_index() {
    let (manager, store) = manager();
    let mut codes = Vec::new();
    for _ in 0..2 {
        let config = TokenConfig::new("owner-c", Duration::minutes(10));
        codes.push(manager.generate_token(TokenKind::Activation, config).await.unwrap());
    }

    let removed = manager
        .invalidate_all_user_tokens("owner-c", TokenKind::Activation)
        .await
        .unwrap();
    assert_eq!(removed, 2);

    for code in &codes {
        let err = manager
            .validate_token("owner-c", code, TokenKind::Activation)
            .await
            .unwrap_err();
        assert_eq!(err.token_error(), Some(&TokenError::NotFound));
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn refresh_exchange_keeps_the_owner() {
    let jwt = jwt_service();
    let pair = jwt.generate_token_pair("owner-d").unwrap();

    let access = jwt.refresh_access_token(&pair.refresh_token).unwrap();
    let claims = jwt.validate_access_token(&access).unwrap();
    assert_eq!(claims.user_id, "owner-d");
    assert_eq!(claims.token_type, TokenKind::Access);
}

#[tokio::test]
async fn forged_headers_are_rejected() {
    let jwt = jwt_service();
    let token = jwt.generate_access_token("owner-e").unwrap();
    let mut parts = token.split('.');
    let _header = parts.next().unwrap();
    let payload = parts.next().unwrap();

    let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let unsigned = format!("{}.{}.", none_header, payload);
    assert!(jwt.validate_access_token(&unsigned).is_err());

    let rs_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let confused = format!("{}.{}.c2lnbmF0dXJl", rs_header, payload);
    let err = jwt.validate_access_token(&confused).unwrap_err();
    assert!(matches!(err.token_error(), Some(TokenError::UnexpectedAlgorithm { .. })));

    let signature = token.rsplit('.').next().unwrap();
    let flipped = if signature.starts_with('A') { 'Q' } else { 'A' };
    let tampered = format!(
        "{}{}{}",
        &token[..token.len() - signature.len()],
        flipped,
        &signature[1..]
    );
    let err = jwt.validate_access_token(&tampered).unwrap_err();
    assert!(err.is_unauthenticated());
}

#[tokio::test]
async fn single_invalidate_leaves_siblings_in_place() {
    let (manager, store) = manager();
    let first = manager
        .generate_token(TokenKind::TwoFactor, TokenConfig::new("owner-f", Duration::minutes(5)))
        .await
        .unwrap();
    let second = manager
        .generate_token(TokenKind::TwoFactor, TokenConfig::new("owner-f", Duration::minutes(5)))
        .await
        .unwrap();

    manager
        .invalidate_token("owner-f", TokenKind::TwoFactor, &first)
        .await
        .unwrap();

    let members = store.set_members("user_tokens:owner-f:two_factor").await.unwrap();
    assert_eq!(members.len(), 1);
    if first != second {
        assert!(manager
            .validate_token("owner-f", &second, TokenKind::TwoFactor)
            .await
            .is_ok());
    }
}
