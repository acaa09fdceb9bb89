//! Token variants and the factory that builds them
//!
//! This module provides:
//! - The `Token` contract shared by every kind
//! - Numeric one-time codes (activation, two-factor)
//! - HMAC-signed claims tokens (access, refresh)
//! - Random-secret tokens (OAuth2 client secrets)
//! - A pluggable CSPRNG source

mod factory;
mod one_time_code;
mod random;
mod secret;
mod signed;
mod traits;

#[cfg(test)]
pub(crate) mod tests;

pub use factory::TokenFactory;
pub use one_time_code::{NumericCodeToken, ACTIVATION_CODE_DIGITS, TWO_FACTOR_CODE_DIGITS};
pub use random::{OsRandom, SecureRandom};
pub use secret::{RandomSecretToken, SECRET_HEX_LENGTH};
pub use signed::{decode_signed, SignedClaimsToken, SIGNING_ALGORITHM};
pub use traits::Token;
