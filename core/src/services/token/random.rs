//! Cryptographically secure random source used by every token variant.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::TokenError;

/// Source of cryptographically secure random bytes
///
/// Failures are surfaced to the caller; there is no weaker fallback source.
pub trait SecureRandom: Send + Sync + fmt::Debug {
    fn fill(&self, dest: &mut [u8]) -> Result<(), TokenError>;
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), TokenError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| TokenError::GenerationFailed {
                reason: format!("OS random source unavailable: {}", e),
            })
    }
}

/// Uniform integer in `[0, bound)` by rejection sampling over 32-bit draws
pub(crate) fn uniform_below(random: &dyn SecureRandom, bound: u32) -> Result<u32, TokenError> {
    if bound == 0 {
        return Err(TokenError::GenerationFailed {
            reason: "empty sampling range".to_string(),
        });
    }
    // Largest multiple of `bound` representable; draws at or above it are biased
    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let mut buf = [0u8; 4];
        random.fill(&mut buf)?;
        let value = u32::from_le_bytes(buf);
        if value < zone {
            return Ok(value % bound);
        }
    }
}
