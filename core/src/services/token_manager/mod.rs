//! Stateful token store
//!
//! Persists activation codes, two-factor codes and OAuth2 secrets with a
//! per-owner, per-kind index so they can be validated and revoked.

mod lifetimes;
mod service;

#[cfg(test)]
mod tests;

pub use lifetimes::TokenLifetimes;
pub use service::TokenManager;
