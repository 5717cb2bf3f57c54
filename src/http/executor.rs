//! Request execution engine.
//!
//! # Responsibilities
//! - Send a prepared request over the shared blocking transport
//! - Classify the response: success, ignored status, protocol failure
//! - Route 429 responses through the injected rate-limit policy
//! - Wrap transport faults into `MatrixError::Transport`
//!
//! # Design Decisions
//! - One reqwest client per handle; clones share the connection pool
//! - Text and content modes share a single classification loop
//! - Calls block the calling thread, including any rate-limit wait

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;

use crate::config::schema::HttpConfig;
use crate::error::{MatrixError, MatrixResult};
use crate::http::error_info::ErrorInfo;
use crate::http::request::PreparedRequest;
use crate::http::response::ContentResult;
use crate::observability::logging::redact_access_token;
use crate::observability::metrics;
use crate::resilience::rate_limit::{FailOnRateLimit, RateLimitDecision, RateLimitPolicy};

/// Executes prepared requests and classifies their responses.
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    rate_limit: Arc<dyn RateLimitPolicy>,
    request_timeout: Duration,
}

impl HttpExecutor {
    /// Build the transport with the configured timeouts.
    pub fn new(config: &HttpConfig) -> MatrixResult<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client).with_request_timeout(request_timeout))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            rate_limit: Arc::new(FailOnRateLimit),
            request_timeout: Duration::from_secs(HttpConfig::default().request_timeout_secs),
        }
    }

    /// Record the client-wide request timeout, used as the base for long polls.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Replace the rate-limit policy.
    pub fn with_rate_limit_policy(mut self, policy: Arc<dyn RateLimitPolicy>) -> Self {
        self.rate_limit = policy;
        self
    }

    /// Text mode: `Some(body)` on 200, `None` for an ignored status.
    pub fn execute(&self, request: &PreparedRequest) -> MatrixResult<Option<String>> {
        self.run(
            request,
            |response| {
                tracing::debug!("Request successfully executed.");
                Ok(Some(response.text()?))
            },
            |_| None,
        )
    }

    /// Text mode for calls where an ignored status makes no sense.
    pub fn execute_required(&self, request: &PreparedRequest) -> MatrixResult<String> {
        self.execute(request)?.ok_or_else(|| {
            MatrixError::InvalidResponse(format!(
                "no body from {}",
                redact_access_token(request.url().as_str())
            ))
        })
    }

    /// Content mode: status, headers and raw payload.
    pub fn execute_content(&self, request: &PreparedRequest) -> MatrixResult<ContentResult> {
        self.run(
            request,
            |response| {
                tracing::debug!("Request successfully executed.");
                if !response.headers().contains_key(CONTENT_TYPE) {
                    tracing::debug!("No content type was given.");
                }
                let status = response.status().as_u16();
                let headers = response.headers().clone();
                let data = response.bytes()?.to_vec();
                if data.is_empty() {
                    tracing::debug!("No data received.");
                }
                Ok(ContentResult::new(status, headers, data))
            },
            ContentResult::absent,
        )
    }

    fn run<T>(
        &self,
        request: &PreparedRequest,
        on_success: impl FnOnce(Response) -> MatrixResult<T>,
        on_ignored: impl FnOnce(u16) -> T,
    ) -> MatrixResult<T> {
        let method = request.method().as_str();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let start = Instant::now();
            let response = self.send(request)?;
            let status = response.status().as_u16();
            metrics::record_request(method, status, start);

            if status == 200 {
                return on_success(response);
            }

            if request.is_ignored(status) {
                tracing::debug!(status, "Error code ignored");
                return Ok(on_ignored(status));
            }

            let body = response.text()?;
            let info = ErrorInfo::classify(&body, status);

            if status == 429 {
                match self.rate_limit.on_rate_limited(attempt, info.as_ref()) {
                    RateLimitDecision::RetryAfter(delay) => {
                        metrics::record_rate_limited("retry");
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Request was rate limited, retrying"
                        );
                        std::thread::sleep(delay);
                        continue;
                    }
                    RateLimitDecision::Fail => {
                        metrics::record_rate_limited("fail");
                        return Err(MatrixError::RateLimited { info });
                    }
                }
            }

            return Err(MatrixError::request_failed(status, info));
        }
    }

    fn send(&self, request: &PreparedRequest) -> MatrixResult<Response> {
        tracing::debug!(
            method = %request.method(),
            url = %redact_access_token(request.url().as_str()),
            "Doing request"
        );

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone());
        if let Some(body) = request.body() {
            builder = builder
                .header(CONTENT_TYPE, body.content_type.as_str())
                .body(body.data.clone());
        }
        if let Some(timeout) = request.request_timeout() {
            builder = builder.timeout(timeout);
        }

        builder.send().map_err(|e| {
            metrics::record_transport_error(request.method().as_str());
            let err = MatrixError::from(e);
            tracing::debug!(error = %err, "Transport failure");
            err
        })
    }
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
