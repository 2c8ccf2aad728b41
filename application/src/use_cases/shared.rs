//! Shared utilities for use cases.
//!
//! Contains the bounded retry loop used for every oracle call.

use crate::config::RetryPolicy;
use crate::ports::answer_oracle::OracleError;
use std::future::Future;
use tracing::warn;

/// Run an oracle call, retrying transient failures with exponential backoff.
///
/// Returns the last error once retries are exhausted or the error is not
/// transient.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, OracleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OracleError>>,
{
    let mut retry = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.backoff_for(retry);
                warn!(
                    operation,
                    retry,
                    error = %e,
                    "Oracle call failed, retrying in {:?}",
                    delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::immediate(2), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(OracleError::Timeout)
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(1), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(OracleError::RateLimited)
        })
        .await;
        assert_eq!(result, Err(OracleError::RateLimited));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(3), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(OracleError::Rejected("bad key".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_between_attempts() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_backoff: std::time::Duration::from_millis(500),
        };
        let start = tokio::time::Instant::now();
        let _: Result<(), _> =
            with_retry(&policy, "test", || async { Err(OracleError::Timeout) }).await;
        // 500ms + 1000ms
        assert!(start.elapsed() >= std::time::Duration::from_millis(1500));
    }
}
