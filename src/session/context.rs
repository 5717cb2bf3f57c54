//! Session context: server addresses, credentials and acting identity.
//!
//! Values are updated by consuming builder methods, each returning the new
//! context. The client handle owns one context and swaps it at the top of a
//! flow (after login, logout or discovery); helpers only ever see `&SessionContext`.

use std::fmt;

use url::Url;

use crate::session::UserId;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    domain: Option<String>,
    homeserver_url: Option<Url>,
    identity_server_url: Option<Url>,
    access_token: Option<String>,
    device_id: Option<String>,
    user: Option<UserId>,
    is_virtual: bool,
    initial_device_display_name: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a human-entered server name, resolved later through discovery.
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self::new().with_domain(domain)
    }

    pub fn for_homeserver(url: Url) -> Self {
        Self::new().with_homeserver_url(url)
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_homeserver_url(mut self, url: Url) -> Self {
        self.homeserver_url = Some(url);
        self
    }

    pub fn with_identity_server_url(mut self, url: Url) -> Self {
        self.identity_server_url = Some(url);
        self
    }

    /// Set or clear the access token. An empty token counts as no token.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_device_id(mut self, device_id: Option<String>) -> Self {
        self.device_id = device_id.filter(|d| !d.is_empty());
        self
    }

    pub fn with_user(mut self, user: Option<UserId>) -> Self {
        self.user = user;
        self
    }

    pub fn with_initial_device_display_name(mut self, name: Option<String>) -> Self {
        self.initial_device_display_name = name;
        self
    }

    /// Switch impersonation on or off. Does not touch the acting user.
    pub fn with_virtual(mut self, is_virtual: bool) -> Self {
        self.is_virtual = is_virtual;
        self
    }

    /// Act as `user` on every request, via impersonation.
    pub fn impersonating(self, user: UserId) -> Self {
        self.with_user(Some(user)).with_virtual(true)
    }

    /// Apply the result of a successful login or registration.
    pub fn authenticated(self, access_token: String, device_id: Option<String>, user: UserId) -> Self {
        self.with_access_token(Some(access_token))
            .with_device_id(device_id)
            .with_user(Some(user))
    }

    /// Drop credentials and identity. Server addresses are kept.
    pub fn logged_out(mut self) -> Self {
        self.access_token = None;
        self.device_id = None;
        self.user = None;
        self
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn homeserver_url(&self) -> Option<&Url> {
        self.homeserver_url.as_ref()
    }

    pub fn identity_server_url(&self) -> Option<&Url> {
        self.identity_server_url.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn initial_device_display_name(&self) -> Option<&str> {
        self.initial_device_display_name.as_deref()
    }

    /// Server name used for new user ids: the domain if set, otherwise the home server host.
    pub fn server_name(&self) -> Option<String> {
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.trim().is_empty()) {
            return Some(domain.to_string());
        }
        let url = self.homeserver_url.as_ref()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("domain", &self.domain)
            .field("homeserver_url", &self.homeserver_url.as_ref().map(Url::as_str))
            .field("identity_server_url", &self.identity_server_url.as_ref().map(Url::as_str))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("device_id", &self.device_id)
            .field("user", &self.user.as_ref().map(UserId::as_str))
            .field("is_virtual", &self.is_virtual)
            .finish()
    }
}
