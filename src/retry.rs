//! retry loop
//!
//! drives a transport attempt up to `max_retries + 1` times. the delay
//! before retry `k` is `base_delay * k` (linear, not exponential).
//! only retryable (transport) failures loop; everything else returns at once.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// default backoff unit
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// bounded linear-backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// retries allowed after the first attempt
    pub max_retries: u32,
    /// delay unit; retry `k` waits `base_delay * k`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// policy with the default backoff unit
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// set the backoff unit
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// delay before the retry that follows failure number `failures`
    pub fn delay_for(&self, failures: u32) -> Duration {
        self.base_delay.saturating_mul(failures)
    }

    /// run `attempt` until it succeeds, fails terminally, or the budget is spent
    ///
    /// exhausting the budget yields [`Error::RetriesExhausted`] carrying the
    /// last transport failure. dropping the returned future stops the loop.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut failures: u32 = 0;
        loop {
            let err = match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => err,
            };

            failures += 1;
            if failures > self.max_retries {
                warn!(attempts = failures, error = %err, "retries exhausted");
                return Err(Error::RetriesExhausted {
                    attempts: failures,
                    message: err.to_string(),
                });
            }

            let delay = self.delay_for(failures);
            debug!(
                attempt = failures,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying graphql request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn transport_failure() -> Error {
        let err = reqwest::Client::new()
            .post("http://[unterminated")
            .build()
            .expect_err("invalid url must fail");
        Error::Http(err)
    }

    #[test]
    fn test_delay_is_linear() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(3000));

        let fast = policy.with_base_delay(Duration::from_millis(10));
        assert_eq!(fast.delay_for(4), Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let value = RetryPolicy::new(3)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, Error>(7) }
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_terminal_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let err = RetryPolicy::new(3)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(Error::HttpStatus {
                        status: 500,
                        body: "boom".to_string(),
                    })
                }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_max_retries_plus_one() {
        let expected = transport_failure().to_string();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let err = RetryPolicy::new(2)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(transport_failure()) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            Error::RetriesExhausted { attempts, message } => {
                assert_eq!(attempts, 3);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let err = RetryPolicy::new(0)
            .run(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(transport_failure()) }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RetriesExhausted { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_timing() {
        let started = Instant::now();
        let stamps = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let recorder = stamps.clone();
        let result = RetryPolicy::new(2)
            .run(|| {
                recorder.lock().push(started.elapsed());
                async { Err::<(), _>(transport_failure()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(
            *stamps.lock(),
            vec![
                Duration::ZERO,
                Duration::from_millis(1000),
                Duration::from_millis(3000),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let value = RetryPolicy::new(3)
            .run(|| {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(transport_failure())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(value, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_future_stops_loop() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(5);
        let run = policy.run(|| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(transport_failure()) }
        });
        let outcome = tokio::time::timeout(Duration::from_millis(1500), run).await;
        assert!(outcome.is_err());
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
