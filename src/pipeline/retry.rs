//! Retry policy for chat-completion attempts.
//!
//! [`RetryPolicy`] holds the attempt budget, the delay schedule and the
//! predicate deciding which failures qualify for another attempt.
//!
//! The default is linear backoff: 3 attempts, waiting 2 s before the second
//! and 4 s before the third, retrying only connection-class failures.

use crate::error::TransportError;
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryError {
    /// Every attempt failed with a retryable error; `last` is the final one.
    Exhausted { attempts: u32, last: TransportError },
    /// A non-retryable error ended the run after `attempts` attempts.
    Fatal { attempts: u32, error: TransportError },
}

/// Attempt budget, delay schedule and retryable-error predicate.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always ≥ 1.
    pub max_attempts: u32,
    /// Delay unit: the wait before attempt `n` (1-based, n ≥ 2) is `base_delay * (n - 1)`.
    pub base_delay: Duration,
    /// Which failures are worth another attempt.
    pub retryable: fn(&TransportError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Linear backoff retrying connection-class failures.
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            retryable: TransportError::is_connection_class,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::linear(1, Duration::ZERO)
    }

    /// Wait before the 1-based `attempt`. Zero for the first attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * attempt.saturating_sub(1)
    }

    /// Run `op` until it succeeds, fails fatally, or the budget runs out.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if !(self.retryable)(&error) => {
                    return Err(RetryError::Fatal {
                        attempts: attempt,
                        error,
                    });
                }
                Err(error) if attempt >= self.max_attempts => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
                Err(error) => {
                    attempt += 1;
                    let delay = self.delay_before(attempt);
                    warn!(
                        "attempt {}/{} failed ({}), retrying in {:?}",
                        attempt - 1,
                        self.max_attempts,
                        error,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
