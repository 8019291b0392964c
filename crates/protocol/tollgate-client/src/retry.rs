//! Retry logic with a fixed delay.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::{ClientError, ClientResult};

/// Retry policy with a fixed delay between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt)
    max_attempts: u32,
    /// Delay between attempts
    delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Create from transport config.
    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.max_attempts(), config.retry_delay)
    }

    /// A policy that makes exactly one attempt.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Maximum number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Execute an async operation with retry logic.
    ///
    /// Only retries on retryable errors (network, timeout). Returns
    /// immediately on non-retryable errors. A final transport error
    /// reports the number of attempts made.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> ClientResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation(attempt).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Retryable error, will retry"
                    );
                    if !self.delay.is_zero() {
                        debug!(attempt, delay = ?self.delay, "Retrying after delay");
                        sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(e.with_attempts(attempt)),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TransportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_execute_success_first_attempt() {
        let policy = RetryPolicy::default();
        let result = policy.execute(|_| async { Ok::<_, ClientError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_execute_retries_transport_errors() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        let result = policy
            .execute(|_| {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err(ClientError::transport("http://x", "connection refused"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_exhausts_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        let result: ClientResult<()> = policy
            .execute(|_| {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(ClientError::transport("http://x", "timed out"))
                }
            })
            .await;

        match result {
            Err(ClientError::Transport { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected transport error, got {:?}", other),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_no_retry_on_other_errors() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        let result: ClientResult<()> = policy
            .execute(|_| {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(ClientError::invalid_request("bad header"))
                }
            })
            .await;

        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        let start = tokio::time::Instant::now();

        let _: ClientResult<()> = policy
            .execute(|_| async { Err(ClientError::transport("http://x", "refused")) })
            .await;

        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1100),
            "two delays of 500ms expected, got {:?}",
            elapsed
        );
    }

    #[test]
    fn test_once_and_zero_attempts() {
        assert_eq!(RetryPolicy::once().max_attempts(), 1);
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }
}
