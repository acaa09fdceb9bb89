//! Business services for issuing, storing and checking tokens and sessions.

pub mod auth;
pub mod jwt;
pub mod session;
pub mod token;
pub mod token_manager;

// Re-export commonly used types
pub use auth::{AuthSessionService, LoginResult, SessionMetadata};
pub use jwt::{JwtService, JwtServiceConfig};
pub use session::SessionStore;
pub use token::{
    NumericCodeToken, OsRandom, RandomSecretToken, SecureRandom, SignedClaimsToken, Token,
    TokenFactory,
};
pub use token_manager::{TokenLifetimes, TokenManager};
