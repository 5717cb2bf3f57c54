//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! 429 from the home server:
//!     → rate_limit.rs (policy decides: fail, or wait and resubmit)
//!     → backoff.rs (delay when the server gave no retry_after_ms)
//! ```
//!
//! # Design Decisions
//! - Timeouts are set once on the transport; every call has a deadline
//! - Nothing is retried unless the caller opted into a retry policy
//! - Transport errors and non-429 failures are never retried here

pub mod backoff;
pub mod rate_limit;

pub use rate_limit::{
    policy_from_config, FailOnRateLimit, RateLimitDecision, RateLimitPolicy, RetryOnRateLimit,
};
