//! Matrix client-server HTTP transport library

pub mod auth;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod session;

pub use auth::PasswordCredentials;
pub use client::MatrixClient;
pub use config::schema::ClientConfig;
pub use error::{MatrixError, MatrixResult};
pub use session::{Capabilities, Capability, SessionContext, UserId};
