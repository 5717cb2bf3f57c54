//! Client handle and endpoint wrappers.
//!
//! # Data Flow
//! ```text
//! MatrixClient method
//!     → http::path (context + API version → URL, user_id / access_token)
//!     → http::executor (send, classify, rate-limit policy)
//!     → serde_json (typed response)
//!     → context swap for login / logout / registration / discovery
//! ```

mod matrix_client;
pub mod media;
pub mod profile;
pub mod rooms;

pub use matrix_client::MatrixClient;
pub use profile::Presence;
pub use rooms::{RoomAliasLookup, SyncOptions};
