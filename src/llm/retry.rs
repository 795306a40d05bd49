//! Retry decorator for chat backends.
//!
//! Wraps any [`ChatBackend`] so call sites stay retry-agnostic:
//! - 429: honour `Retry-After` when the server sends one, otherwise back off.
//! - 5xx: back off.
//! - anything else: fail immediately.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use super::backend::ChatBackend;
use super::config::RetryConfig;
use super::error::LlmError;
use super::types::ChatRequest;

/// Exponential backoff with jitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first call included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap on a single delay.
    pub max_delay: Duration,
    /// Maximum random jitter added to computed backoffs.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: Duration::from_millis(config.jitter_ms),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based), without jitter.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay to wait after failed attempt `attempt`.
    ///
    /// A server-supplied delay wins over the computed backoff but is still
    /// capped by `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(delay) = retry_after {
            return delay.min(self.max_delay);
        }
        self.backoff(attempt) + self.random_jitter()
    }

    fn random_jitter(&self) -> Duration {
        let max = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }
}

/// A [`ChatBackend`] that retries rate-limited and server-side failures.
pub struct Retrying<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B: ChatBackend> Retrying<B> {
    /// Wrap a backend with a retry policy.
    #[must_use]
    pub const fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped backend.
    #[must_use]
    pub const fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: ChatBackend> ChatBackend for Retrying<B> {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut attempt = 1;
        loop {
            match self.inner.chat(request).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt, err.retry_after());
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "model call failed ({err}), retrying"
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
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::llm::types::CompletionParams;

    /// Backend replaying a fixed script of outcomes.
    struct Scripted {
        script: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(script: Vec<Result<String, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for Scripted {
        async fn chat(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("exhausted".to_string()))
        }
    }

    fn status(code: u16, retry_after: Option<Duration>) -> Result<String, LlmError> {
        Err(LlmError::Status {
            status: code,
            body: String::new(),
            retry_after,
        })
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: Duration::from_millis(1),
        }
    }

    fn request() -> ChatRequest {
        ChatRequest::new("m", "s", "u", CompletionParams::default())
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            jitter: Duration::ZERO,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(5), Duration::from_millis(1000));
        assert_eq!(policy.backoff(64), Duration::from_millis(1000));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            jitter: Duration::from_millis(50),
        };
        for _ in 0..100 {
            let delay = policy.delay_for(1, None);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_retry_after_wins_but_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: Duration::from_millis(50),
        };
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(60))),
            Duration::from_secs(10)
        );
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let backend = Retrying::new(
            Scripted::new(vec![
                status(429, Some(Duration::from_millis(1))),
                status(503, None),
                Ok("done".to_string()),
            ]),
            fast_policy(3),
        );
        assert_eq!(backend.chat(&request()).await.unwrap(), "done");
        assert_eq!(backend.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let backend = Retrying::new(
            Scripted::new(vec![status(401, None), Ok("never".to_string())]),
            fast_policy(5),
        );
        let err = backend.chat(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Status { status: 401, .. }));
        assert_eq!(backend.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let backend = Retrying::new(
            Scripted::new(vec![
                status(500, None),
                status(500, None),
                status(500, None),
                Ok("too late".to_string()),
            ]),
            fast_policy(3),
        );
        let err = backend.chat(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Status { status: 500, .. }));
        assert_eq!(backend.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let backend = Retrying::new(
            Scripted::new(vec![Err(LlmError::Timeout(Duration::from_secs(1)))]),
            fast_policy(3),
        );
        assert!(matches!(
            backend.chat(&request()).await,
            Err(LlmError::Timeout(_))
        ));
        assert_eq!(backend.inner().calls.load(Ordering::SeqCst), 1);
    }
}
