//! Mock random sources for testing

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::TokenError;
use crate::services::token::SecureRandom;

/// Random source that always fails
#[derive(Debug, Default)]
pub struct FailingRandom {
    pub calls: AtomicUsize,
}

impl FailingRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SecureRandom for FailingRandom {
    fn fill(&self, _dest: &mut [u8]) -> Result<(), TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TokenError::GenerationFailed {
            reason: "entropy source unavailable".to_string(),
        })
    }
}

/// Random source that fills every buffer with one byte value
#[derive(Debug)]
pub struct FixedRandom(pub u8);

impl SecureRandom for FixedRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), TokenError> {
        dest.fill(self.0);
        Ok(())
    }
}
