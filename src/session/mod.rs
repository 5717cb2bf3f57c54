//! Session state subsystem.
//!
//! # Data Flow
//! ```text
//! config / caller
//!     → SessionContext (domain or home server URL)
//!     → discovery replaces server URLs
//!     → login / registration adds token, device id, user
//!     → every request reads it through the URL builder
//!     → logout drops credentials
//! ```
//!
//! # Design Decisions
//! - Absence is explicit: every optional field is an `Option`
//! - No interior mutability; a context shared between threads must be
//!   cloned or put behind a lock by the caller

pub mod capabilities;
pub mod context;
pub mod user_id;

pub use capabilities::{Capabilities, Capability};
pub use context::SessionContext;
pub use user_id::UserId;
