//! Retry policy for page fetches
//!
//! The wait before attempt `n + 1` is `base * 2^n` plus a fixed penalty that
//! depends on how attempt `n` failed: timeouts wait longer than other errors.

use crate::config::FetcherConfig;
use crate::crawler::fetcher::FetchError;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff with a failure-class penalty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Base of the exponential term
    pub base_delay: Duration,

    /// Added after timeout-class failures
    pub timeout_penalty: Duration,

    /// Added after every other failure
    pub generic_penalty: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: Duration::from_millis(config.backoff_base_ms),
            timeout_penalty: Duration::from_millis(config.timeout_penalty_ms),
            generic_penalty: Duration::from_millis(config.generic_penalty_ms),
        }
    }

    /// A policy that never waits, for tests and dry runs
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            timeout_penalty: Duration::ZERO,
            generic_penalty: Duration::ZERO,
        }
    }

    /// Wait before retrying after `attempt` (zero-indexed) failed with `error`
    pub fn delay_for(&self, attempt: u32, error: &FetchError) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)));
        let penalty = if error.is_timeout() {
            self.timeout_penalty
        } else {
            self.generic_penalty
        };
        exponential.saturating_add(penalty)
    }

    /// Returns true if another attempt should follow the failed `attempt`
    pub fn should_retry(&self, attempt: u32, error: &FetchError) -> bool {
        attempt + 1 < self.max_attempts && error.is_retryable()
    }

    /// Runs `operation` until it succeeds or the policy gives up
    ///
    /// The closure receives the zero-indexed attempt number. A non-retryable
    /// error is returned as is; running out of attempts wraps the last error
    /// in [`FetchError::Exhausted`].
    pub async fn retry<T, F, Fut>(&self, url: &str, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) if !self.should_retry(attempt, &error) => {
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt + 1,
                        last: Box::new(error),
                    });
                }
                Err(error) => {
                    let delay = self.delay_for(attempt, &error);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt + 1,
                        self.max_attempts,
                        url,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
