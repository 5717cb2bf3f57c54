//! Rate-limit handling policies.
//!
//! # Responsibilities
//! - Decide what the executor does with a 429 response
//! - Provide the default fail-fast policy and an opt-in retry policy
//!
//! # Design Decisions
//! - Policies are injected objects, not executor subclasses
//! - The default never sends a second request
//! - The retry policy prefers the server's `retry_after_ms` hint over backoff

use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::{RateLimitConfig, RateLimitMode};
use crate::http::error_info::ErrorInfo;
use crate::resilience::backoff::calculate_backoff;

/// Outcome of a rate-limit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Raise `MatrixError::RateLimited`.
    Fail,
    /// Sleep for the given delay and resubmit the same request.
    RetryAfter(Duration),
}

/// Decides what to do when the server answers 429.
pub trait RateLimitPolicy: Send + Sync {
    /// `attempt` is the 1-based number of the request that was just rate limited.
    fn on_rate_limited(&self, attempt: u32, info: Option<&ErrorInfo>) -> RateLimitDecision;
}

/// Default policy: always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnRateLimit;

impl RateLimitPolicy for FailOnRateLimit {
    fn on_rate_limited(&self, _attempt: u32, _info: Option<&ErrorInfo>) -> RateLimitDecision {
        RateLimitDecision::Fail
    }
}

/// Opt-in policy: wait and resubmit, up to `max_retries` times.
#[derive(Debug, Clone)]
pub struct RetryOnRateLimit {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryOnRateLimit {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }
}

impl RateLimitPolicy for RetryOnRateLimit {
    fn on_rate_limited(&self, attempt: u32, info: Option<&ErrorInfo>) -> RateLimitDecision {
        if attempt > self.max_retries {
            return RateLimitDecision::Fail;
        }
        let delay = match info.and_then(|i| i.retry_after_ms) {
            Some(ms) => Duration::from_millis(ms).min(self.max_delay),
            None => calculate_backoff(attempt, self.base_delay, self.max_delay),
        };
        RateLimitDecision::RetryAfter(delay)
    }
}

/// Build the policy selected in config.
pub fn policy_from_config(config: &RateLimitConfig) -> Arc<dyn RateLimitPolicy> {
    match config.policy {
        RateLimitMode::Fail => Arc::new(FailOnRateLimit),
        RateLimitMode::Retry => Arc::new(RetryOnRateLimit::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limited(retry_after_ms: Option<u64>) -> ErrorInfo {
        ErrorInfo {
            errcode: "M_LIMIT_EXCEEDED".into(),
            error: "Too many requests".into(),
            retry_after_ms,
        }
    }

    #[test]
    fn test_default_always_fails() {
        let policy = FailOnRateLimit;
        assert_eq!(
            policy.on_rate_limited(1, Some(&limited(Some(10)))),
            RateLimitDecision::Fail
        );
        assert_eq!(policy.on_rate_limited(1, None), RateLimitDecision::Fail);
    }

    #[test]
    fn test_retry_honors_hint() {
        let policy = RetryOnRateLimit::new(2, Duration::from_millis(100), Duration::from_secs(5));
        assert_eq!(
            policy.on_rate_limited(1, Some(&limited(Some(1500)))),
            RateLimitDecision::RetryAfter(Duration::from_millis(1500))
        );
        // Hint is capped.
        assert_eq!(
            policy.on_rate_limited(2, Some(&limited(Some(60_000)))),
            RateLimitDecision::RetryAfter(Duration::from_secs(5))
        );
        assert_eq!(policy.on_rate_limited(3, None), RateLimitDecision::Fail);
    }

    #[test]
    fn test_retry_falls_back_to_backoff() {
        let policy = RetryOnRateLimit::new(3, Duration::from_millis(100), Duration::from_secs(5));
        match policy.on_rate_limited(2, None) {
            RateLimitDecision::RetryAfter(d) => assert!(d >= Duration::from_millis(200)),
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = RateLimitConfig::default();
        assert_eq!(
            policy_from_config(&config).on_rate_limited(1, None),
            RateLimitDecision::Fail
        );
        config.policy = RateLimitMode::Retry;
        assert!(matches!(
            policy_from_config(&config).on_rate_limited(1, Some(&limited(Some(5)))),
            RateLimitDecision::RetryAfter(_)
        ));
    }
}
