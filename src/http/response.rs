//! Content-mode results.
//!
//! # Responsibilities
//! - Expose status, headers and the raw payload of a media download
//! - Represent an ignored status as an invalid, empty result

use reqwest::header::{HeaderMap, CONTENT_TYPE};

/// Result of a content-mode request.
#[derive(Debug, Clone)]
pub struct ContentResult {
    status: u16,
    valid: bool,
    headers: HeaderMap,
    data: Vec<u8>,
}

impl ContentResult {
    pub(crate) fn new(status: u16, headers: HeaderMap, data: Vec<u8>) -> Self {
        Self {
            status,
            valid: status == 200,
            headers,
            data,
        }
    }

    /// Result for a status the caller declared as ignored.
    pub(crate) fn absent(status: u16) -> Self {
        Self {
            status,
            valid: false,
            headers: HeaderMap::new(),
            data: Vec::new(),
        }
    }

    /// True when the server answered 200 and the body was read.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
