//! The client handle.
//!
//! # Responsibilities
//! - Own the session context and swap it after discovery, login, registration and logout
//! - Build endpoint URLs from the context and the configured API versions
//! - Gate administrative and impersonation calls on the capability set
//!
//! # Design Decisions
//! - One type for every role; behaviour differs by `Capabilities`, not by subtype
//! - Mutating flows take `&mut self`; the handle has no internal locking

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::auth::{
    ApplicationServiceRegistration, LoginRequest, LoginResponse, PasswordCredentials,
    SharedSecretRegistration,
};
use crate::config::schema::{ApiConfig, ClientConfig};
use crate::discovery::{checks, DiscoverySettings, Resolver};
use crate::error::{MatrixError, MatrixResult};
use crate::http::executor::HttpExecutor;
use crate::http::path;
use crate::http::request::PreparedRequest;
use crate::resilience::rate_limit::policy_from_config;
use crate::session::{Capabilities, Capability, SessionContext, UserId};

/// A Matrix client-server API handle.
///
/// A handle is single-owner: flows that change the session (discovery,
/// login, logout, registration) take `&mut self`. Share one between threads
/// only behind an external lock such as `Mutex<MatrixClient>`. Cloning gives
/// an independent session over the same connection pool.
#[derive(Debug, Clone)]
pub struct MatrixClient {
    pub(super) context: SessionContext,
    pub(super) executor: HttpExecutor,
    pub(super) api: ApiConfig,
    pub(super) capabilities: Capabilities,
    well_known_base: Option<Url>,
    discovery_deadline: Option<Duration>,
}

impl MatrixClient {
    /// A standard client over `context`.
    pub fn new(context: SessionContext, executor: HttpExecutor) -> Self {
        Self {
            context,
            executor,
            api: ApiConfig::default(),
            capabilities: Capabilities::standard(),
            well_known_base: None,
            discovery_deadline: None,
        }
    }

    /// Build a client from a validated configuration.
    pub fn from_config(config: &ClientConfig) -> MatrixResult<Self> {
        let executor = HttpExecutor::new(&config.http)?
            .with_rate_limit_policy(policy_from_config(&config.rate_limit));
        let capabilities: Capabilities = config.capabilities.iter().copied().collect();

        let mut context = SessionContext::new();
        if let Some(domain) = &config.server.domain {
            context = context.with_domain(domain.clone());
        }
        if let Some(url) = &config.server.homeserver_url {
            context = context.with_homeserver_url(parse_config_url("server.homeserver_url", url)?);
        }
        if let Some(url) = &config.server.identity_server_url {
            context = context.with_identity_server_url(parse_config_url("server.identity_server_url", url)?);
        }

        let session = &config.session;
        let user = session
            .user_id
            .as_deref()
            .map(UserId::parse)
            .transpose()
            .map_err(|e| MatrixError::InvalidState(format!("session.user_id: {}", e)))?;
        context = context
            .with_access_token(session.access_token.clone())
            .with_device_id(session.device_id.clone())
            .with_user(user)
            .with_initial_device_display_name(session.initial_device_display_name.clone());

        if session.is_virtual {
            capabilities.require(Capability::VirtualImpersonation)?;
            context = context.with_virtual(true);
        }

        let well_known_base = config
            .discovery
            .well_known_base_url
            .as_deref()
            .map(|url| parse_config_url("discovery.well_known_base_url", url))
            .transpose()?;

        Ok(Self {
            context,
            executor,
            api: config.api.clone(),
            capabilities,
            well_known_base,
            discovery_deadline: config.discovery.deadline_secs.map(Duration::from_secs),
        })
    }

    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Fetch the discovery document from `base` rather than `https://{hostname}`.
    pub fn with_well_known_base(mut self, base: Option<Url>) -> Self {
        self.well_known_base = base;
        self
    }

    /// Overall time budget for probing discovery candidates.
    pub fn with_discovery_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.discovery_deadline = deadline;
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Replace the session context wholesale.
    pub fn set_context(&mut self, context: SessionContext) {
        self.context = context;
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn executor(&self) -> &HttpExecutor {
        &self.executor
    }

    pub fn is_logged_in(&self) -> bool {
        self.context.access_token().is_some()
    }

    pub(super) fn acting_user(&self) -> MatrixResult<&UserId> {
        self.context
            .user()
            .ok_or_else(|| MatrixError::InvalidState("No acting user is set, log in first".into()))
    }

    /// Client API URL, unauthenticated.
    pub(super) fn client_url(&self, path: &str) -> MatrixResult<Url> {
        path::homeserver_url(&self.context, "client", &self.api.client_version, path)
    }

    /// Client API URL carrying the access token.
    pub(super) fn authenticated_client_url(&self, path: &str) -> MatrixResult<Url> {
        path::authenticated_url(&self.context, "client", &self.api.client_version, path)
    }

    /// Resolve the home server and identity server for the context's domain.
    ///
    /// On success the selected URLs replace those in the context and the
    /// parsed document is returned. `Ok(None)` means the domain publishes
    /// no document and the configured home server is kept.
    pub fn discover(&mut self) -> MatrixResult<Option<DiscoverySettings>> {
        let discovery = Resolver::new(&self.executor, &self.api)
            .with_well_known_base(self.well_known_base.clone())
            .with_deadline(self.discovery_deadline)
            .resolve(&self.context)?;

        Ok(discovery.map(|discovery| {
            self.context = discovery.apply(std::mem::take(&mut self.context));
            discovery.settings
        }))
    }

    /// Protocol versions advertised by the home server.
    pub fn versions(&self) -> MatrixResult<Vec<String>> {
        checks::fetch_versions(&self.executor, &self.context)
    }

    /// Whether the context's identity server answers its validation request.
    pub fn validate_identity_server(&self) -> MatrixResult<bool> {
        checks::validate_identity_server(&self.executor, &self.context, &self.api)
    }

    /// Password login. Credentials from the response replace those in the context.
    pub fn login(&mut self, credentials: &PasswordCredentials) -> MatrixResult<()> {
        let url = self.client_url("login")?;
        let body = LoginRequest::password(credentials, &self.context);
        let response = self
            .executor
            .execute_required(&PreparedRequest::post(url).json(&body)?)?;

        self.context = LoginResponse::parse(&response)?.apply(self.context.clone())?;
        tracing::info!(
            user = self.context.user().map(UserId::as_str),
            device_id = self.context.device_id(),
            "Logged in"
        );
        Ok(())
    }

    /// End the session. The context is cleared even when the server call fails.
    pub fn logout(&mut self) -> MatrixResult<()> {
        let url = self.authenticated_client_url("logout")?;
        let result = PreparedRequest::post(url)
            .json(&json!({}))
            .and_then(|request| self.executor.execute_required(&request));

        self.context = std::mem::take(&mut self.context).logged_out();
        match &result {
            Ok(_) => tracing::info!("Logged out"),
            Err(e) => tracing::warn!(error = %e, "Logout request failed, local session cleared anyway"),
        }
        result.map(|_| ())
    }

    /// Register `localpart` with the server's shared secret, then act as the new user.
    pub fn register_with_shared_secret(
        &mut self,
        shared_secret: &str,
        credentials: &PasswordCredentials,
        admin: bool,
    ) -> MatrixResult<()> {
        self.capabilities.require(Capability::AdminRegistration)?;

        let url = path::homeserver_url(
            &self.context,
            "client",
            &self.api.registration_version,
            "register",
        )?;
        let body = SharedSecretRegistration::new(
            shared_secret,
            &credentials.user,
            &credentials.password,
            admin,
        )?;
        let response = self
            .executor
            .execute_required(&PreparedRequest::post(url).json(&body)?)?;

        self.context = LoginResponse::parse(&response)?.apply(self.context.clone())?;
        tracing::info!(user = self.context.user().map(UserId::as_str), admin, "Registered user");
        Ok(())
    }

    /// The user the access token belongs to.
    pub fn whoami(&self) -> MatrixResult<UserId> {
        #[derive(Deserialize)]
        struct WhoAmI {
            user_id: String,
        }

        let url = self.authenticated_client_url("account/whoami")?;
        let body = self.executor.execute_required(&PreparedRequest::get(url))?;
        let whoami: WhoAmI = serde_json::from_str(&body)?;
        UserId::parse(&whoami.user_id)
    }

    /// Register a virtual user through the application service and return a
    /// client acting as that user.
    pub fn create_virtual_user(&self, localpart: &str) -> MatrixResult<MatrixClient> {
        self.capabilities.require(Capability::VirtualImpersonation)?;
        tracing::debug!(localpart, "Creating new virtual user");
        let client = self.as_virtual_user(localpart)?;

        let url = self.authenticated_client_url("register")?;
        let body = ApplicationServiceRegistration::new(localpart);
        self.executor
            .execute_required(&PreparedRequest::post(url).json(&body)?)?;

        Ok(client)
    }

    /// A client acting as `@{localpart}:{server}` through impersonation.
    /// Shares this handle's access token and connection pool.
    pub fn as_virtual_user(&self, localpart: &str) -> MatrixResult<MatrixClient> {
        self.capabilities.require(Capability::VirtualImpersonation)?;

        let server = self.context.server_name().ok_or_else(|| {
            MatrixError::InvalidState("A domain or home server URL is required to name virtual users".into())
        })?;
        let user = UserId::from_localpart(localpart, &server)?;

        let mut client = self.clone();
        client.context = self.context.clone().impersonating(user);
        Ok(client)
    }
}

fn parse_config_url(field: &str, value: &str) -> MatrixResult<Url> {
    Url::parse(value).map_err(|e| MatrixError::InvalidState(format!("{}: {}", field, e)))
}
