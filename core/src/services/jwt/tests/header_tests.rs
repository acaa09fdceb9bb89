//! Unit tests for bearer header parsing

use crate::errors::TokenError;
use crate::services::jwt::JwtService;

#[test]
fn test_extracts_bearer_token() {
    assert_eq!(JwtService::extract_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
}

#[test]
fn test_scheme_is_case_insensitive() {
    assert_eq!(JwtService::extract_token("bearer abc").unwrap(), "abc");
    assert_eq!(JwtService::extract_token("BEARER abc").unwrap(), "abc");
}

#[test]
fn test_rejects_malformed_headers() {
    for header in [
        "",
        "   ",
        "Bearer",
        "Bearer ",
        "Bearer  abc",
        "Bearer abc def",
        "Basic abc",
        "Token abc",
        "abc",
    ] {
        let err = JwtService::extract_token(header).unwrap_err();
        assert!(
            matches!(err, TokenError::MalformedHeader { .. }),
            "header {:?} gave {:?}",
            header,
            err
        );
    }
}
