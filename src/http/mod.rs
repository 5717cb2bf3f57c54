//! HTTP request subsystem.
//!
//! # Data Flow
//! ```text
//! SessionContext + module/version/path
//!     → path.rs (base/_matrix/{module}/{version}/{path}, user_id, access_token)
//!     → request.rs (method, body, ignored statuses)
//!     → executor.rs (send, classify, rate-limit policy)
//!         → error_info.rs on failure bodies
//!     → body text / ContentResult / MatrixError
//! ```

pub mod error_info;
pub mod executor;
pub mod path;
pub mod request;
pub mod response;

pub use error_info::ErrorInfo;
pub use executor::HttpExecutor;
pub use request::PreparedRequest;
pub use response::ContentResult;
