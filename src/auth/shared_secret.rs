//! Shared-secret (administrative) registration.
//!
//! The server authenticates the request with
//! `hex(HMAC-SHA1(secret, localpart \0 password \0 "admin"|"notadmin"))`.

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;

use crate::error::{MatrixError, MatrixResult};

type HmacSha1 = Hmac<Sha1>;

pub const SHARED_SECRET_LOGIN_TYPE: &str = "org.matrix.login.shared_secret";

/// Compute the registration MAC for `localpart` / `password`.
pub fn registration_mac(
    secret: &str,
    localpart: &str,
    password: &str,
    admin: bool,
) -> MatrixResult<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| MatrixError::InvalidState(format!("Unusable shared secret: {}", e)))?;
    mac.update(localpart.as_bytes());
    mac.update(b"\0");
    mac.update(password.as_bytes());
    mac.update(b"\0");
    mac.update(if admin { b"admin" as &[u8] } else { b"notadmin" });
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Clone, Serialize)]
pub struct SharedSecretRegistration {
    pub user: String,
    pub password: String,
    pub mac: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub admin: bool,
}

impl SharedSecretRegistration {
    pub fn new(secret: &str, localpart: &str, password: &str, admin: bool) -> MatrixResult<Self> {
        Ok(Self {
            user: localpart.to_string(),
            password: password.to_string(),
            mac: registration_mac(secret, localpart, password, admin)?,
            kind: SHARED_SECRET_LOGIN_TYPE,
            admin,
        })
    }
}
