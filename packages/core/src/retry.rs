//! Shared exponential backoff, used by the scraper's proxy/download loop,
//! the summarizer worker's LLM calls, and the notifier's push POST.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    pub const fn new(base: Duration, cap: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            cap,
            max_attempts,
        }
    }

    /// Scraper proxy/download policy: base 1s, cap 30s, 5 attempts.
    pub const fn scraper() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30), 5)
    }

    /// Summarizer LLM-call policy: base 2s, cap 30s, 3 attempts.
    pub const fn llm() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(30), 3)
    }

    /// Notifier push policy: 3 attempts, same shape as the LLM policy.
    pub const fn notifier() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(15), 3)
    }

    /// Delay before attempt `attempt` (0-indexed), full jitter in `[0, computed)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base.as_millis().saturating_mul(1u128 << attempt.min(20));
        let capped = exp.min(self.cap.as_millis());
        let jittered = rand::thread_rng().gen_range(0..=capped.max(1));
        Duration::from_millis(jittered as u64)
    }
}

/// Runs `f` up to `policy.max_attempts` times. `is_retryable` decides whether
/// a given error should be retried; `retry_after` lets the caller honor a
/// server-provided `Retry-After` instead of the computed backoff delay.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: BackoffPolicy,
    mut f: F,
    is_retryable: impl Fn(&E) -> bool,
    mut retry_after: impl FnMut(&E) -> Option<Duration>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempt += 1;
                if attempt >= policy.max_attempts || !is_retryable(&e) {
                    return Err(e);
                }
                let delay = retry_after(&e).unwrap_or_else(|| policy.delay_for(attempt));
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(
            BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(5), 5),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| true,
            |_| None,
        )
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(
            BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(2), 3),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>("always fails") }
            },
            |_| true,
            |_| None,
        )
        .await;
        assert_eq!(result, Err("always fails"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_immediately_on_non_retryable() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(
            BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(2), 5),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>("fatal") }
            },
            |_| false,
            |_| None,
        )
        .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
