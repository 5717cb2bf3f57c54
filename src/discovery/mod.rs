//! Server discovery subsystem.
//!
//! # Data Flow
//! ```text
//! SessionContext.domain
//!     → resolver.rs (strip port, GET https://{host}/.well-known/matrix/client, 404 ignored)
//!     → well_known.rs (document → ordered candidates)
//!     → checks.rs (versions for home servers, `{}` check for identity servers)
//!     → Discovery (selected URLs) applied to the context by the client
//! ```

pub mod checks;
pub mod resolver;
pub mod well_known;

pub use resolver::{Discovery, Resolver};
pub use well_known::DiscoverySettings;
