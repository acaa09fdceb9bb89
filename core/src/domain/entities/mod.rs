//! Domain entities representing core business objects.

pub mod session;
pub mod token;

// Re-export commonly used types
pub use session::Session;
pub use token::{
    Claims, LocalClaims, StoredToken, TokenClaims, TokenConfig, TokenKind, TokenPair,
};
