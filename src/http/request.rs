//! Prepared requests.
//!
//! # Responsibilities
//! - Hold everything needed to (re)send one call: method, URL, body
//! - Declare statuses that mean "no result" rather than failure
//! - Carry an optional per-request timeout for long-poll calls
//!
//! # Design Decisions
//! - Immutable once built; the executor rebuilds the reqwest request on every attempt
//! - Bodies are owned bytes so a rate-limited call can be resubmitted as-is

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::MatrixResult;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Body attached to a prepared request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// One HTTP call, ready to hand to the executor.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    body: Option<RequestBody>,
    ignored_statuses: BTreeSet<u16>,
    timeout: Option<Duration>,
}

impl PreparedRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            ignored_statuses: BTreeSet::new(),
            timeout: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> MatrixResult<Self> {
        let data = serde_json::to_vec(value)?;
        self.body = Some(RequestBody {
            content_type: JSON_CONTENT_TYPE.to_string(),
            data,
        });
        Ok(self)
    }

    pub fn bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Some(RequestBody {
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Treat `status` as an expected "nothing here" outcome.
    pub fn ignore_status(mut self, status: u16) -> Self {
        self.ignored_statuses.insert(status);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_ignored(&self, status: u16) -> bool {
        self.ignored_statuses.contains(&status)
    }

    pub fn ignored_statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.ignored_statuses.iter().copied()
    }
}
