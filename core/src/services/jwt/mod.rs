//! Signing service for self-verifying tokens
//!
//! Issues HS256 access and refresh tokens, parses bearer headers, and
//! exchanges refresh tokens for new access tokens.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::JwtServiceConfig;
pub use service::JwtService;
