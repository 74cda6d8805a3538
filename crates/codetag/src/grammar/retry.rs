//! Bounded exponential backoff with cooperative cancellation.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// How often and how patiently to retry.
///
/// With the defaults an operation runs at most four times, sleeping 1s, 2s
/// and 4s between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `retry` (zero-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Why a retried operation gave up.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The token was cancelled; the operation is not retried.
    Aborted,
    /// The operation failed with `E` and either the budget is spent or `E`
    /// was not worth retrying.
    Failed(E),
}

/// Run `op` until it succeeds, the budget is spent, or `cancel` fires.
///
/// `retryable` decides per error whether another attempt is made. The
/// token is checked before every attempt, raced against every attempt and
/// against every backoff sleep, so cancellation drops an in-flight `op`
/// future instead of waiting for it.
///
/// # Errors
///
/// Returns [`RetryError::Aborted`] once `cancel` is cancelled and
/// [`RetryError::Failed`] with the last error otherwise.
pub async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Aborted);
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetryError::Aborted),
            result = op() => result,
        };

        let error = match result {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if retry >= policy.retries || !retryable(&error) {
            return Err(RetryError::Failed(error));
        }

        let delay = policy.delay_for(retry);
        warn!(
            attempt = retry + 1,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %error,
            "Attempt failed, retrying"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetryError::Aborted),
            () = tokio::time::sleep(delay) => {}
        }
        retry += 1;
    }
}
