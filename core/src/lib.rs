//! # VetClinic Core
//!
//! Token and session layer for the VetClinic backend.
//! This crate holds the token variants and their factory, the signing
//! service for access and refresh tokens, the store-backed token manager
//! for one-time codes and secrets, and login session persistence.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Claims, LocalClaims, Session, StoredToken, TokenClaims, TokenConfig, TokenKind, TokenPair,
};
pub use errors::{DomainError, DomainResult, ErrorCategory, ResultExt, StoreError, TokenError};
pub use repositories::{KeyValueStore, MemoryKeyValueStore, StoreOp, Transaction};
pub use services::{
    AuthSessionService, JwtService, JwtServiceConfig, LoginResult, SessionMetadata, SessionStore,
    Token, TokenFactory, TokenLifetimes, TokenManager,
};
