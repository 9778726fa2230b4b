//! Bounded-retry policy for external service calls.

use std::time::Duration;

/// Default retry attempt count
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default backoff base delay
const DEFAULT_BACKOFF_SECS: f32 = 2.0;

/// Bounded retry with linear backoff.
///
/// Reusable across any fallible async call; the delay before attempt
/// `n + 1` is `backoff_base * n`.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Base delay multiplied by the attempt number
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_secs_f32(DEFAULT_BACKOFF_SECS),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt count and base delay.
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    /// Delay to sleep after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }

    /// Run `op` until it succeeds or attempts are exhausted.
    ///
    /// Sleeps between attempts; the final error is returned unchanged.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(attempt, delay_secs = delay.as_secs_f32(), error = %e, "attempt failed, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
