//! Feed fetching with retries.
//!
//! The retry schedule lives in [`RetryPolicy`], a pure object, and the delay
//! itself goes through the [`Sleeper`] trait, so tests exercise the full
//! retry path without real network or real waits.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::anyhow;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// A source could not be retrieved after exhausting all attempts. Fatal to
/// the pipeline run it occurred in.
#[derive(Debug, Error)]
#[error("failed to fetch {label} after {attempts} attempts: {cause}")]
pub struct FetchError {
    pub label: String,
    pub attempts: u32,
    pub cause: anyhow::Error,
}

/// Exponential backoff schedule: `base_delay` after the first failure,
/// doubling after each subsequent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the zero-based `attempt` failed, or `None` when
    /// it was the final attempt (no delay before giving up).
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(self.base_delay * 2u32.saturating_pow(attempt))
    }
}

/// Suspends the current fetch between attempts. Other concurrent fetches
/// are unaffected.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Fetches a text resource, retrying transient failures per the policy.
pub struct RetryingFetcher<C, S> {
    client: C,
    sleeper: S,
    policy: RetryPolicy,
}

impl<C: HttpClient> RetryingFetcher<C, TokioSleeper> {
    pub fn new(client: C) -> Self {
        RetryingFetcher {
            client,
            sleeper: TokioSleeper,
            policy: RetryPolicy::default(),
        }
    }
}

impl<C: HttpClient, S: Sleeper> RetryingFetcher<C, S> {
    pub fn with_policy(client: C, policy: RetryPolicy, sleeper: S) -> Self {
        RetryingFetcher {
            client,
            sleeper,
            policy,
        }
    }

    /// Fetches `url`, retrying up to the policy's attempt limit. `label`
    /// names the resource in diagnostics and in the terminal [`FetchError`],
    /// which preserves the last underlying failure.
    pub async fn fetch(&self, url: &str, label: &str) -> Result<String, FetchError> {
        let mut last_err = None;

        for attempt in 0..self.policy.max_attempts {
            match self.client.get_text(url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    warn!(
                        label,
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_attempts,
                        error = %err,
                        "fetch attempt failed"
                    );
                    last_err = Some(err);

                    if let Some(delay) = self.policy.delay_after(attempt) {
                        self.sleeper.sleep(delay).await;
                    }
                }
            }
        }

        Err(FetchError {
            label: label.to_string(),
            attempts: self.policy.max_attempts,
            cause: last_err.unwrap_or_else(|| anyhow!("no attempts were made")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then returns the payload.
    struct FlakyClient {
        failures: u32,
        calls: AtomicU32,
        payload: &'static str,
    }

    #[async_trait]
    impl HttpClient for FlakyClient {
        async fn get_text(&self, _url: &str) -> anyhow::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                bail!("status 503");
            }
            Ok(self.payload.to_string())
        }
    }

    /// Records requested delays instead of waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }

    fn fetcher(failures: u32) -> RetryingFetcher<FlakyClient, RecordingSleeper> {
        RetryingFetcher::with_policy(
            FlakyClient {
                failures,
                calls: AtomicU32::new(0),
                payload: "ts,value\n",
            },
            RetryPolicy::default(),
            RecordingSleeper::default(),
        )
    }

    #[test]
    fn test_policy_doubles_and_terminates() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_after(0), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(2000)));
        assert_eq!(policy.delay_after(2), None);
    }

    #[tokio::test]
    async fn test_first_attempt_success_no_delays() {
        let f = fetcher(0);
        let body = f.fetch("http://x/orders.csv", "Orders").await.unwrap();

        assert_eq!(body, "ts,value\n");
        assert!(f.sleeper.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_two_failures_then_success() {
        let f = fetcher(2);
        let body = f.fetch("http://x/orders.csv", "Orders").await.unwrap();

        assert_eq!(body, "ts,value\n");
        assert_eq!(
            *f.sleeper.delays.lock().unwrap(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[tokio::test]
    async fn test_exhausted_attempts_fail_without_final_delay() {
        let f = fetcher(3);
        let err = f.fetch("http://x/orders.csv", "Orders").await.unwrap_err();

        assert_eq!(err.label, "Orders");
        assert_eq!(err.attempts, 3);
        assert!(err.to_string().contains("status 503"));
        // No delay after the last failed attempt.
        assert_eq!(
            *f.sleeper.delays.lock().unwrap(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }
}
