//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → MatrixClient::from_config builds context, executor and capabilities
//! ```
//!
//! # Design Decisions
//! - Config is read once when a client handle is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::{ApiConfig, DiscoveryConfig, HttpConfig, RateLimitConfig, RateLimitMode};
