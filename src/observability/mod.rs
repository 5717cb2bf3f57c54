//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! executor / resolver / auth flows produce:
//!     → logging.rs (structured log events, token-redacted URLs)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → tracing subscriber installed by the binary
//!     → whatever metrics recorder the application installs
//! ```
//!
//! # Design Decisions
//! - Access tokens never reach a log line
//! - The library never installs global state on its own

pub mod logging;
pub mod metrics;
