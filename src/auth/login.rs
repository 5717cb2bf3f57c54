//! Login, registration and session response payloads.

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};
use crate::session::{SessionContext, UserId};

pub const PASSWORD_LOGIN_TYPE: &str = "m.login.password";
pub const USER_IDENTIFIER_TYPE: &str = "m.id.user";
pub const APPLICATION_SERVICE_LOGIN_TYPE: &str = "m.login.application_service";

/// Username and password pair.
#[derive(Clone)]
pub struct PasswordCredentials {
    pub user: String,
    pub password: String,
}

impl PasswordCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct UserIdentifier {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub user: String,
}

/// `POST /login` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub identifier: UserIdentifier,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_device_display_name: Option<String>,
}

impl LoginRequest {
    /// Build a password login for `ctx`, resuming its device when it has one.
    /// The display name only applies to new devices.
    pub fn password(credentials: &PasswordCredentials, ctx: &SessionContext) -> Self {
        let device_id = ctx.device_id().map(str::to_string);
        let initial_device_display_name = match device_id {
            Some(_) => None,
            None => ctx.initial_device_display_name().map(str::to_string),
        };

        Self {
            kind: PASSWORD_LOGIN_TYPE,
            identifier: UserIdentifier {
                kind: USER_IDENTIFIER_TYPE,
                user: credentials.user.clone(),
            },
            password: credentials.password.clone(),
            device_id,
            initial_device_display_name,
        }
    }
}

/// Application-service registration of a virtual user.
#[derive(Debug, Serialize)]
pub struct ApplicationServiceRegistration {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub username: String,
}

impl ApplicationServiceRegistration {
    pub fn new(localpart: impl Into<String>) -> Self {
        Self {
            kind: APPLICATION_SERVICE_LOGIN_TYPE,
            username: localpart.into(),
        }
    }
}

/// Response of login and registration calls.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    pub user_id: String,
}

impl LoginResponse {
    pub fn parse(body: &str) -> MatrixResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| MatrixError::InvalidResponse(format!("Unexpected login response: {}", e)))
    }

    /// Store the credentials in `ctx`.
    pub fn apply(self, ctx: SessionContext) -> MatrixResult<SessionContext> {
        let token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MatrixError::InvalidResponse("Login response carries no access token".into()))?;
        let user = UserId::parse(&self.user_id)?;
        Ok(ctx.authenticated(token, self.device_id, user))
    }
}
