//! `.well-known/matrix/client` documents.
//!
//! ```json
//! {
//!   "m.homeserver": {"base_url": "https://matrix.example.org"},
//!   "m.identity_server": {"base_url": ["https://id1.example.org", "https://id2.example.org"]}
//! }
//! ```
//!
//! `base_url` may be a single string or an ordered list of alternates.

use serde::Deserialize;
use url::Url;

use crate::error::{MatrixError, MatrixResult};

#[derive(Debug, Deserialize)]
struct WellKnownDocument {
    #[serde(rename = "m.homeserver")]
    homeserver: Option<ServerEntry>,

    #[serde(rename = "m.identity_server")]
    identity_server: Option<ServerEntry>,
}

#[derive(Debug, Deserialize)]
struct ServerEntry {
    base_url: Option<BaseUrls>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BaseUrls {
    One(String),
    Many(Vec<String>),
}

impl ServerEntry {
    fn raw_urls(self) -> Vec<String> {
        match self.base_url {
            Some(BaseUrls::One(url)) => vec![url],
            Some(BaseUrls::Many(urls)) => urls,
            None => Vec::new(),
        }
    }
}

/// Ordered server candidates parsed from a discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoverySettings {
    homeserver_candidates: Vec<Url>,
    identity_server_candidates: Vec<Url>,
}

impl DiscoverySettings {
    pub fn new(homeserver_candidates: Vec<Url>, identity_server_candidates: Vec<Url>) -> Self {
        Self {
            homeserver_candidates,
            identity_server_candidates,
        }
    }

    /// Parse a discovery document body.
    pub fn parse(body: &str) -> MatrixResult<Self> {
        let doc: WellKnownDocument = serde_json::from_str(body).map_err(|e| {
            MatrixError::InvalidState(format!("Invalid .well-known document: {}", e))
        })?;

        Ok(Self::new(
            candidates(doc.homeserver),
            candidates(doc.identity_server),
        ))
    }

    pub fn homeserver_candidates(&self) -> &[Url] {
        &self.homeserver_candidates
    }

    pub fn identity_server_candidates(&self) -> &[Url] {
        &self.identity_server_candidates
    }
}

fn candidates(entry: Option<ServerEntry>) -> Vec<Url> {
    let mut out: Vec<Url> = Vec::new();
    for raw in entry.map(ServerEntry::raw_urls).unwrap_or_default() {
        if let Some(url) = parse_candidate(&raw) {
            if !out.contains(&url) {
                out.push(url);
            }
        }
    }
    out
}

/// Normalize one `base_url` entry. Entries without a scheme are assumed to be HTTPS.
fn parse_candidate(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = match Url::parse(&with_scheme) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(candidate = %raw, error = %e, "Ignoring invalid discovery candidate");
            return None;
        }
    };
    if !matches!(url.scheme(), "http" | "https") || url.host_str().map_or(true, str::is_empty) {
        tracing::warn!(url = %url, "Ignoring discovery candidate with unsupported scheme or no host");
        return None;
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    Some(url)
}
