//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::future::Future;
use tokio::time::Duration;

/// Retry policy: attempt count, first delay and growth factor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Backoff {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Wait after the first failure
    pub base_delay: Duration,
    /// Factor applied to the wait after each further failure
    pub multiplier: u32,
}

impl Backoff {
    /// Policy used for code signing: 3 attempts, waiting 15s then 30s.
    pub const SIGNING: Backoff = Backoff {
        max_attempts: 3,
        base_delay: Duration::from_secs(15),
        multiplier: 2,
    };

    /// Wait before attempt `attempt + 1`, given `attempt` failures so far (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::SIGNING
    }
}

/// Runs `operation` until it succeeds or `backoff.max_attempts` is reached.
///
/// Sleeps on the tokio timer between attempts, so tests can run it under a
/// paused clock. Returns the last error when every attempt fails.
pub async fn retry_with_backoff<F, Fut, T, E>(
    backoff: &Backoff,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = backoff.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                log::warn!(
                    "{} failed after {} attempt(s): {}",
                    operation_name,
                    attempt,
                    e
                );
                return Err(e);
            }
            Err(e) => {
                let wait = backoff.delay_after(attempt);
                log::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {}s",
                    operation_name,
                    attempt,
                    max_attempts,
                    e,
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
