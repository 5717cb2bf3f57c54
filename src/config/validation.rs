//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that a home server can be reached or discovered
//! - Validate value ranges (timeouts > 0, delays ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use url::Url;

use crate::config::schema::{ClientConfig, RateLimitMode};
use crate::session::UserId;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        if let Err(e) = Url::parse(value) {
            errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
        }
    }
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let has_domain = config
        .server
        .domain
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if !has_domain && config.server.homeserver_url.is_none() {
        errors.push(ValidationError::new(
            "server",
            "either domain or homeserver_url must be set",
        ));
    }
    check_url(&mut errors, "server.homeserver_url", config.server.homeserver_url.as_deref());
    check_url(
        &mut errors,
        "server.identity_server_url",
        config.server.identity_server_url.as_deref(),
    );
    check_url(
        &mut errors,
        "discovery.well_known_base_url",
        config.discovery.well_known_base_url.as_deref(),
    );

    if config.http.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("http.connect_timeout_secs", "must be greater than 0"));
    }
    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new("http.request_timeout_secs", "must be greater than 0"));
    }

    if config.api.client_version.trim().is_empty() {
        errors.push(ValidationError::new("api.client_version", "must not be empty"));
    }

    if let Some(user_id) = config.session.user_id.as_deref() {
        if UserId::parse(user_id).is_err() {
            errors.push(ValidationError::new(
                "session.user_id",
                format!("'{}' is not of the form @localpart:domain", user_id),
            ));
        }
    }
    if config.session.is_virtual && config.session.user_id.is_none() {
        errors.push(ValidationError::new(
            "session.is_virtual",
            "virtual mode requires session.user_id",
        ));
    }

    if config.rate_limit.policy == RateLimitMode::Retry && config.rate_limit.max_retries == 0 {
        errors.push(ValidationError::new(
            "rate_limit.max_retries",
            "must be greater than 0 with the retry policy",
        ));
    }
    if config.rate_limit.base_delay_ms > config.rate_limit.max_delay_ms {
        errors.push(ValidationError::new(
            "rate_limit.base_delay_ms",
            "must not exceed rate_limit.max_delay_ms",
        ));
    }

    if config.discovery.deadline_secs == Some(0) {
        errors.push(ValidationError::new("discovery.deadline_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
