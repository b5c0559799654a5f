//! Bounded exponential backoff around a fallible AI call.
//!
//! Only errors that `LlmError::is_retryable` accepts (rate limit / quota) are
//! retried. Everything else is returned on first failure.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::llm_client::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total calls are at most `max_retries + 1`.
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Runs `operation`, sleeping through `sleep` between retryable failures.
/// The delay doubles after every retry.
pub async fn with_retry<T, Op, Fut, Sleep, SleepFut>(
    policy: RetryPolicy,
    mut sleep: Sleep,
    mut operation: Op,
) -> Result<T, LlmError>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
    Sleep: FnMut(Duration) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let mut retries_left = policy.max_retries;
    let mut delay = policy.initial_delay;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && retries_left > 0 => {
                warn!(
                    "AI endpoint throttled ({err}); retrying in {}ms ({} retries left)",
                    delay.as_millis(),
                    retries_left
                );
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                retries_left -= 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// `with_retry` using the tokio timer.
pub async fn retry_with_backoff<T, Op, Fut>(policy: RetryPolicy, operation: Op) -> Result<T, LlmError>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    with_retry(policy, tokio::time::sleep, operation).await
}
