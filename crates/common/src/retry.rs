//! Retry with exponential backoff.
//!
//! Re-invokes a failing operation while the failure is worth retrying:
//! transport failures, rate limiting and server errors qualify; any other
//! client error (4xx) is permanent and short-circuits immediately. The
//! delay doubles on every attempt (`base_delay * 2^attempt`).

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::NormalizedError;

/// Run `operation`, retrying up to `max_retries` additional times.
///
/// Retry eligibility is decided by [`NormalizedError::is_retryable`]: an
/// HTTP 4xx other than 429 is returned immediately. When every attempt
/// fails, the last error is returned.
///
/// # Errors
/// The last observed error once attempts are exhausted, or the first
/// non-retryable error.
pub async fn with_retry<T, F, Fut>(
    mut operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T, NormalizedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NormalizedError>>,
{
    let mut attempt = 0_u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_retries || !error.is_retryable() {
                    return Err(error);
                }
                let delay = backoff_delay(base_delay, attempt);
                debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    status = error.status,
                    "retrying failed operation"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    // Cap the shift so pathological retry counts cannot overflow.
    let multiplier = 1_u32 << attempt.min(16);
    base.saturating_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::NormalizedError;

    #[tokio::test]
    async fn not_found_is_never_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let result: Result<(), _> = with_retry(
            move || {
                let counter = counter.clone();
                async move {
                    let _ = counter.fetch_add(1, Ordering::SeqCst);
                    Err(NormalizedError::from_response(404, None, None))
                }
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limiting_is_retried_to_exhaustion() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let result: Result<(), _> = with_retry(
            move || {
                let counter = counter.clone();
                async move {
                    let _ = counter.fetch_add(1, Ordering::SeqCst);
                    Err(NormalizedError::from_response(429, None, None))
                }
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4); // initial try + 3 retries
    }

    #[tokio::test]
    async fn network_failures_are_retried_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let result = with_retry(
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(NormalizedError::network("connection reset"))
                    } else {
                        Ok("recovered")
                    }
                }
            },
            5,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_returns_the_last_error() {
        let result: Result<(), _> = with_retry(
            || async { Err(NormalizedError::from_response(503, None, None)) },
            2,
            Duration::from_millis(1),
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.status, 503);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(400));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
    }
}
