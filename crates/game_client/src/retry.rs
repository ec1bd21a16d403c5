//! Delay schedule for re-fetching the current round after transport failures.

use std::time::Duration;

use common::config::TimingConfig;

/// Doubling delay, capped. There is no attempt limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl RetryPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    /// Fixed delay: every attempt waits `delay`.
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    pub fn from_config(timing: &TimingConfig) -> Self {
        Self::new(
            Duration::from_secs(timing.retry_delay_secs),
            Duration::from_secs(timing.retry_max_delay_secs),
        )
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}
