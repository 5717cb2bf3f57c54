//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Keep access tokens out of logged request URLs
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level

use std::borrow::Cow;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};
use crate::http::path::ACCESS_TOKEN_PARAM;

pub const REDACTED: &str = "<redacted>";

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("matrix_http_client={}", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Replace the value of the `access_token` query parameter with a placeholder.
///
/// Only the token value changes; every other byte of the URL is kept.
pub fn redact_access_token(url: &str) -> Cow<'_, str> {
    let Some(query_start) = url.find('?') else {
        return Cow::Borrowed(url);
    };

    let mut out = String::with_capacity(url.len());
    let mut rest = &url[query_start..];
    let mut redacted = false;
    out.push_str(&url[..query_start]);

    // `rest` always starts at a separator ('?' or '&').
    while !rest.is_empty() {
        let (sep, tail) = rest.split_at(1);
        let end = tail.find(['&', '#']).unwrap_or(tail.len());
        let pair = &tail[..end];
        out.push_str(sep);

        match pair.strip_prefix(ACCESS_TOKEN_PARAM).and_then(|v| v.strip_prefix('=')) {
            Some(_) => {
                out.push_str(ACCESS_TOKEN_PARAM);
                out.push('=');
                out.push_str(REDACTED);
                redacted = true;
            }
            None => out.push_str(pair),
        }

        rest = &tail[end..];
        if rest.starts_with('#') {
            out.push_str(rest);
            break;
        }
    }

    if redacted {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(url)
    }
}
