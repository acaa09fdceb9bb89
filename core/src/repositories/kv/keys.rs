//! Store key layout. These formats are shared with other services reading the
//! same store and must not change.

use crate::domain::entities::token::TokenKind;

/// `token:<owner>_<kind>_<timestamp>`
pub fn token_key(owner_id: &str, kind: TokenKind, timestamp: i64) -> String {
    format!("token:{}_{}_{}", owner_id, kind, timestamp)
}

/// `user_tokens:<owner>:<kind>`
pub fn user_tokens_key(owner_id: &str, kind: TokenKind) -> String {
    format!("user_tokens:{}:{}", owner_id, kind)
}

/// `session:<id>`
pub fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

/// `user_sessions:<owner>`
pub fn user_sessions_key(owner_id: &str) -> String {
    format!("user_sessions:{}", owner_id)
}

/// Store TTL for a lifetime: whole seconds rounded up, never below one
pub fn ttl_seconds(lifetime: chrono::Duration) -> u64 {
    let millis = lifetime.num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    let secs = (millis as u64).div_ceil(1000);
    secs.max(1)
}
