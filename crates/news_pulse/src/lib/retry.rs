use std::{fmt::Debug, future::Future, time::Duration};

/// Exponential-backoff retry policy shared by the external provider
/// clients. Which errors are worth retrying is decided per call site via
/// the `retryable` predicate; everything else fails on the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run `operation`, retrying retryable failures with delays of
    /// `base_delay * 2^(attempt - 1)` until `max_attempts` is reached.
    pub async fn run<T, E, F, Fut, P>(&self, mut operation: F, retryable: P) -> Result<T, E>
    where
        E: Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && retryable(&err) => {
                    let delay = self.base_delay * 2u32.pow(attempt - 1);
                    tracing::warn!(
                        error = ?err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying failed operation"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn zero_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = zero_delay(3)
            .run(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = zero_delay(3)
            .run(
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok(7)
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = zero_delay(3)
            .run(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("always broken")
                },
                |_| true,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = zero_delay(5)
            .run(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("fatal")
                },
                |_| false,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
