//! Authentication session flows
//!
//! Login, access token refresh against a stored session, logout and
//! logout-everywhere. Credential checks happen before `login` is called.

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::AuthSessionService;
pub use types::{LoginResult, SessionMetadata};
