//! Profile and presence endpoints.

use serde::Deserialize;
use serde_json::json;

use crate::client::MatrixClient;
use crate::error::MatrixResult;
use crate::http::request::PreparedRequest;
use crate::session::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Presence {
    pub presence: String,
    #[serde(default)]
    pub last_active_ago: Option<u64>,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub currently_active: Option<bool>,
}

impl MatrixClient {
    /// Display name of `user`, `None` if the server has no profile for them.
    pub fn display_name(&self, user: &UserId) -> MatrixResult<Option<String>> {
        self.profile_field(user, "displayname")
    }

    /// Avatar `mxc://` URI of `user`, `None` if unknown.
    pub fn avatar_url(&self, user: &UserId) -> MatrixResult<Option<String>> {
        self.profile_field(user, "avatar_url")
    }

    /// Set the acting user's display name.
    pub fn set_display_name(&self, name: &str) -> MatrixResult<()> {
        let user = self.acting_user()?;
        let url = self.authenticated_client_url(&format!("profile/{}/displayname", user))?;
        self.executor
            .execute_required(&PreparedRequest::put(url).json(&json!({ "displayname": name }))?)?;
        Ok(())
    }

    /// Presence of `user`, `None` if the server does not know it.
    pub fn presence(&self, user: &UserId) -> MatrixResult<Option<Presence>> {
        let url = self.authenticated_client_url(&format!("presence/{}/status", user))?;
        let body = self
            .executor
            .execute(&PreparedRequest::get(url).ignore_status(404))?;

        match body.filter(|b| !b.trim().is_empty()) {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    fn profile_field(&self, user: &UserId, field: &str) -> MatrixResult<Option<String>> {
        let url = self.authenticated_client_url(&format!("profile/{}/{}", user, field))?;
        let body = self
            .executor
            .execute(&PreparedRequest::get(url).ignore_status(404))?;

        let Some(body) = body else {
            return Ok(None);
        };
        let value: serde_json::Value = serde_json::from_str(&body)?;
        Ok(value.get(field).and_then(|v| v.as_str()).map(str::to_string))
    }
}
