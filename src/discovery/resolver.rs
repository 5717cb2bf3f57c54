//! Well-known auto-discovery.
//!
//! # Responsibilities
//! - Fetch the discovery document for the context's domain
//! - Try home server candidates in order, keep the first that answers `versions`
//! - Try identity server candidates in order, keep the first that validates
//!
//! # Design Decisions
//! - One failing candidate never aborts the search; it is logged and skipped
//! - Candidates are tried through a cloned context; the caller's context is untouched
//! - No overall deadline unless one is configured; each call has its own timeouts

use std::time::{Duration, Instant};

use url::Url;

use crate::config::schema::ApiConfig;
use crate::discovery::checks;
use crate::discovery::well_known::DiscoverySettings;
use crate::error::{MatrixError, MatrixResult};
use crate::http::executor::HttpExecutor;
use crate::http::request::PreparedRequest;
use crate::observability::metrics;
use crate::session::SessionContext;

const NO_HOMESERVER: &str = "No valid Homeserver base URL was found";

/// Outcome of a successful discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub settings: DiscoverySettings,
    pub homeserver_url: Url,
    /// Only set when an identity candidate validated.
    pub identity_server_url: Option<Url>,
}

impl Discovery {
    /// Apply the selected URLs to `ctx`.
    pub fn apply(&self, ctx: SessionContext) -> SessionContext {
        let ctx = ctx.with_homeserver_url(self.homeserver_url.clone());
        match &self.identity_server_url {
            Some(url) => ctx.with_identity_server_url(url.clone()),
            None => ctx,
        }
    }
}

pub struct Resolver<'a> {
    executor: &'a HttpExecutor,
    api: &'a ApiConfig,
    well_known_base: Option<Url>,
    deadline: Option<Duration>,
}

impl<'a> Resolver<'a> {
    pub fn new(executor: &'a HttpExecutor, api: &'a ApiConfig) -> Self {
        Self {
            executor,
            api,
            well_known_base: None,
            deadline: None,
        }
    }

    /// Fetch the document from `base` instead of `https://{hostname}`.
    pub fn with_well_known_base(mut self, base: Option<Url>) -> Self {
        self.well_known_base = base;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Discover the servers for `ctx`'s domain.
    ///
    /// Returns `Ok(None)` when the domain publishes no document but the
    /// context already has a home server URL.
    pub fn resolve(&self, ctx: &SessionContext) -> MatrixResult<Option<Discovery>> {
        let domain = ctx
            .domain()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                MatrixError::InvalidState(
                    "A non-empty Matrix domain must be set to discover the client settings".into(),
                )
            })?;

        let hostname = strip_port(domain);
        tracing::info!(hostname, "Performing .well-known auto-discovery");

        let url = self.well_known_url(hostname)?;
        let body = self
            .executor
            .execute(&PreparedRequest::get(url).ignore_status(404))?;

        let Some(body) = body else {
            if ctx.homeserver_url().is_none() {
                return Err(MatrixError::InvalidState(NO_HOMESERVER.into()));
            }
            tracing::info!(hostname, "No .well-known data found, keeping configured home server");
            return Ok(None);
        };

        if body.trim().is_empty() {
            return Err(MatrixError::InvalidState(
                "The .well-known document is empty".into(),
            ));
        }

        tracing::debug!(body = %body, "Found .well-known data");
        let settings = DiscoverySettings::parse(&body)?;
        if settings.homeserver_candidates().is_empty() {
            return Err(MatrixError::InvalidState(NO_HOMESERVER.into()));
        }

        self.select(ctx, settings).map(Some)
    }

    /// Pick the first working home server and identity server from `settings`.
    pub fn select(&self, ctx: &SessionContext, settings: DiscoverySettings) -> MatrixResult<Discovery> {
        let start = Instant::now();
        let expired = || self.deadline.is_some_and(|d| start.elapsed() >= d);

        let mut homeserver_url = None;
        for candidate in settings.homeserver_candidates() {
            if expired() {
                tracing::warn!("Discovery deadline exceeded, skipping remaining home server candidates");
                break;
            }
            let candidate_ctx = ctx.clone().with_homeserver_url(candidate.clone());
            let accepted = match checks::fetch_versions(self.executor, &candidate_ctx) {
                Ok(versions) if !versions.is_empty() => {
                    tracing::info!(url = %candidate, ?versions, "Found a valid HS");
                    true
                }
                Ok(_) => {
                    tracing::warn!(url = %candidate, "Home server candidate advertised no versions");
                    false
                }
                Err(e) => {
                    tracing::warn!(url = %candidate, error = %e, "Error when trying to fetch home server versions");
                    false
                }
            };
            metrics::record_discovery_candidate("homeserver", accepted);
            if accepted {
                homeserver_url = Some(candidate.clone());
                break;
            }
        }

        let homeserver_url =
            homeserver_url.ok_or_else(|| MatrixError::InvalidState(NO_HOMESERVER.into()))?;
        let base_ctx = ctx.clone().with_homeserver_url(homeserver_url.clone());

        let mut identity_server_url = None;
        for candidate in settings.identity_server_candidates() {
            if expired() {
                tracing::warn!("Discovery deadline exceeded, skipping remaining identity server candidates");
                break;
            }
            let candidate_ctx = base_ctx.clone().with_identity_server_url(candidate.clone());
            let accepted = match checks::validate_identity_server(self.executor, &candidate_ctx, self.api) {
                Ok(true) => {
                    tracing::info!(url = %candidate, "Found a valid IS");
                    true
                }
                Ok(false) => {
                    tracing::warn!(url = %candidate, "Identity server candidate gave an unexpected answer");
                    false
                }
                Err(e) => {
                    tracing::warn!(url = %candidate, error = %e, "Error when trying to validate identity server");
                    false
                }
            };
            metrics::record_discovery_candidate("identity_server", accepted);
            if accepted {
                identity_server_url = Some(candidate.clone());
                break;
            }
        }

        Ok(Discovery {
            settings,
            homeserver_url,
            identity_server_url,
        })
    }

    /// Location of the discovery document for `hostname`.
    pub fn well_known_url(&self, hostname: &str) -> MatrixResult<Url> {
        let mut url = match &self.well_known_base {
            Some(base) => base.clone(),
            None => Url::parse(&format!("https://{}", hostname))?,
        };
        let shown = url.to_string();
        url.path_segments_mut()
            .map_err(|_| MatrixError::InvalidState(format!("{} cannot be used as a base URL", shown)))?
            .pop_if_empty()
            .extend([".well-known", "matrix", "client"]);
        Ok(url)
    }
}

/// Drop a `:port` suffix, leaving bracketed IPv6 literals intact.
fn strip_port(domain: &str) -> &str {
    if domain.starts_with('[') {
        return match domain.find(']') {
            Some(end) => &domain[..=end],
            None => domain,
        };
    }
    domain.split(':').next().unwrap_or(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HttpConfig;

    fn executor() -> HttpExecutor {
        HttpExecutor::new(&HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.org"), "example.org");
        assert_eq!(strip_port("example.org:8448"), "example.org");
        assert_eq!(strip_port("[::1]:8448"), "[::1]");
    }

    #[test]
    fn test_well_known_url() {
        let executor = executor();
        let api = ApiConfig::default();
        let resolver = Resolver::new(&executor, &api);
        assert_eq!(
            resolver.well_known_url("example.org").unwrap().as_str(),
            "https://example.org/.well-known/matrix/client"
        );

        let resolver = resolver.with_well_known_base(Some(Url::parse("http://127.0.0.1:8080/").unwrap()));
        assert_eq!(
            resolver.well_known_url("example.org").unwrap().as_str(),
            "http://127.0.0.1:8080/.well-known/matrix/client"
        );
    }

    #[test]
    fn test_opaque_well_known_base_is_rejected() {
        let executor = executor();
        let api = ApiConfig::default();
        let resolver = Resolver::new(&executor, &api)
            .with_well_known_base(Some(Url::parse("mailto:admin@example.org").unwrap()));

        match resolver.well_known_url("example.org") {
            Err(MatrixError::InvalidState(msg)) => {
                assert_eq!(msg, "mailto:admin@example.org cannot be used as a base URL")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_domain_fails_before_network() {
        let executor = executor();
        let api = ApiConfig::default();
        let resolver = Resolver::new(&executor, &api);

        for ctx in [SessionContext::new(), SessionContext::for_domain("   ")] {
            let err = resolver.resolve(&ctx).unwrap_err();
            assert!(matches!(err, MatrixError::InvalidState(_)));
        }
    }

    #[test]
    fn test_apply_keeps_identity_when_none_validated() {
        let existing = Url::parse("https://id.example.org").unwrap();
        let ctx = SessionContext::for_domain("example.org").with_identity_server_url(existing.clone());
        let discovery = Discovery {
            settings: DiscoverySettings::new(vec![Url::parse("https://hs.example.org").unwrap()], Vec::new()),
            homeserver_url: Url::parse("https://hs.example.org").unwrap(),
            identity_server_url: None,
        };
        let ctx = discovery.apply(ctx);
        assert_eq!(ctx.homeserver_url().map(Url::as_str), Some("https://hs.example.org/"));
        assert_eq!(ctx.identity_server_url(), Some(&existing));
    }
}
