//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a client handle.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::Capability;

/// Root configuration for a Matrix client handle.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Server name and known base URLs.
    pub server: ServerConfig,

    /// HTTP transport settings.
    pub http: HttpConfig,

    /// API version segments used when building URLs.
    pub api: ApiConfig,

    /// Pre-existing session to resume.
    pub session: SessionConfig,

    /// Enabled capabilities; `standard` is implied.
    pub capabilities: Vec<Capability>,

    /// What to do with 429 responses.
    pub rate_limit: RateLimitConfig,

    /// Well-known discovery settings.
    pub discovery: DiscoveryConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Server addresses.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Human-entered server name (e.g. "example.org"), used for discovery.
    pub domain: Option<String>,

    /// Home server base URL, when known without discovery.
    pub homeserver_url: Option<String>,

    /// Identity server base URL.
    pub identity_server_url: Option<String>,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            request_timeout_secs: 60,
            user_agent: concat!("matrix-http-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Version segments for each API family.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// `/_matrix/client/{client_version}/...`
    pub client_version: String,

    /// `/_matrix/media/{media_version}/...`
    pub media_version: String,

    /// Version used for shared-secret registration (legacy endpoint).
    pub registration_version: String,

    /// `/_matrix/identity/{identity_version}/...`
    pub identity_version: String,

    /// Path requested to validate an identity server.
    pub identity_check_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            client_version: "v3".to_string(),
            media_version: "v3".to_string(),
            registration_version: "api/v1".to_string(),
            identity_version: "api".to_string(),
            identity_check_path: "v1".to_string(),
        }
    }
}

/// Session to resume.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub access_token: Option<String>,
    pub device_id: Option<String>,
    pub user_id: Option<String>,

    /// Display name sent with the first login of a new device.
    pub initial_device_display_name: Option<String>,

    /// Start in impersonation mode for `user_id`.
    pub is_virtual: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("device_id", &self.device_id)
            .field("user_id", &self.user_id)
            .field("initial_device_display_name", &self.initial_device_display_name)
            .field("is_virtual", &self.is_virtual)
            .finish()
    }
}

/// Rate-limit policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitMode {
    /// Raise `RateLimited` on the first 429.
    #[default]
    Fail,
    /// Sleep and resubmit, up to `max_retries` times.
    Retry,
}

/// Rate limit handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub policy: RateLimitMode,

    /// Maximum number of resubmissions after a 429.
    pub max_retries: u32,

    /// Base delay for exponential backoff when the server gives no hint, in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound for any single wait, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            policy: RateLimitMode::Fail,
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Fetch `/.well-known/matrix/client` from here instead of `https://{hostname}`.
    pub well_known_base_url: Option<String>,

    /// Overall time budget for probing candidates, in seconds. Unbounded when unset.
    pub deadline_secs: Option<u64>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
