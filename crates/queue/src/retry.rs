//! Queue-owned retry policy.
//!
//! The worker never retries internally; it classifies failures and the queue
//! decides. Recoverable errors re-enqueue with exponentially growing delay
//! until the attempt budget runs out; unrecoverable errors are terminal
//! immediately, regardless of remaining budget.

use std::time::Duration;

use mapwatch_core::error::JobError;

/// Total attempts a job gets, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff delay after the first failed attempt; doubles per attempt.
pub const BACKOFF_BASE: Duration = Duration::from_secs(2);

/// What the queue does with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-enqueue after the given delay.
    Retry { delay: Duration },

    /// Archive as terminally failed.
    Terminal,
}

/// Tunable retry parameters. Defaults match the production queue
/// configuration; tests shrink the base delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff_base: BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    /// Delay before re-delivering a job that has failed `attempt` times:
    /// `base * 2^(attempt - 1)`, so 2 s, 4 s, 8 s… with the default base.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Map a classified failure on the given attempt to a decision.
    pub fn decide(&self, error: &JobError, attempt: u32) -> RetryDecision {
        if !error.is_recoverable() || attempt >= self.max_attempts {
            return RetryDecision::Terminal;
        }
        RetryDecision::Retry {
            delay: self.backoff_delay(attempt),
        }
    }
}
