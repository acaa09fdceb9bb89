//! Shared configuration and common types for the VetClinic server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    ServerConfig, SessionConfig, TokenLifetimeConfig,
};
pub use errors::{error_codes, ErrorResponse};
