//! Client error taxonomy.
//!
//! # Categories
//! - Caller/state errors: detected before any network call, never retried
//! - Transport errors: anything reqwest reports (connect, timeout, body read)
//! - Protocol errors: non-200 responses that were not declared as ignored
//! - Rate limiting: a 429 the active policy decided not to retry
//!
//! Every protocol failure carries the HTTP status. The machine-readable
//! `errcode` is only present when the body parsed as a protocol error.

use thiserror::Error;

use crate::http::error_info::ErrorInfo;

/// Errors raised by the client transport.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The client is not in a state that allows the call.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Connection, timeout or malformed HTTP. The request URL is stripped.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-200, non-ignored status.
    #[error("{message}")]
    Request {
        status: u16,
        info: Option<ErrorInfo>,
        message: String,
    },

    /// The server answered 429 and the rate-limit policy gave up.
    #[error("Request was rate limited.")]
    RateLimited { info: Option<ErrorInfo> },

    /// A successful response did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for client operations.
pub type MatrixResult<T> = Result<T, MatrixError>;

impl From<reqwest::Error> for MatrixError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors print their URL, which may hold an access token.
        MatrixError::Transport(e.without_url())
    }
}

impl MatrixError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        MatrixError::InvalidState(msg.into())
    }

    /// Build the failure for a non-200 status, with whatever detail the body gave.
    pub fn request_failed(status: u16, info: Option<ErrorInfo>) -> Self {
        let mut message = format!("Request failed: {}", status);
        if let Some(ref info) = info {
            message = format!("{} - {} - {}", message, info.errcode, info.error);
        }
        MatrixError::Request {
            status,
            info,
            message,
        }
    }

    /// HTTP status of the response that caused this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            MatrixError::Request { status, .. } => Some(*status),
            MatrixError::RateLimited { .. } => Some(429),
            MatrixError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            MatrixError::Request { info, .. } | MatrixError::RateLimited { info } => info.as_ref(),
            _ => None,
        }
    }

    /// Protocol error code, e.g. `M_FORBIDDEN`.
    pub fn errcode(&self) -> Option<&str> {
        self.info().map(|i| i.errcode.as_str())
    }

    /// Human-readable protocol error message.
    pub fn error_message(&self) -> Option<&str> {
        self.info().map(|i| i.error.as_str())
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, MatrixError::RateLimited { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, MatrixError::Transport(_))
    }
}
