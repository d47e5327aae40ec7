use crate::BACKOFF_BASE;
use crate::BACKOFF_CEILING;
use std::time::Duration;

/// Consecutive connection failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Backoff {
    attempt: u32,
}

impl Backoff {
    /// Count one more failure and return how long to wait before retrying.
    pub fn fail(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        BACKOFF_BASE
            .saturating_mul(2u32.saturating_pow(self.attempt))
            .min(BACKOFF_CEILING)
    }
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}
