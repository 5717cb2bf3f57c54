//! Authentication payloads.
//!
//! # Responsibilities
//! - Password login bodies (device resume, initial display name)
//! - Shared-secret registration bodies and their HMAC
//! - Application-service registration of virtual users
//! - Turning login/registration responses into session credentials
//!
//! The flows themselves live on `MatrixClient`, which owns the context.

pub mod login;
pub mod shared_secret;

pub use login::{ApplicationServiceRegistration, LoginRequest, LoginResponse, PasswordCredentials};
pub use shared_secret::{registration_mac, SharedSecretRegistration};
