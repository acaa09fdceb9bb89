//! Route handlers
//!
//! - `health` - liveness probe
//! - `sessions` - access token refresh, logout and session listing

pub mod health;
pub mod sessions;
