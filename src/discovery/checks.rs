//! Server checks used to validate discovery candidates.

use serde::Deserialize;

use crate::config::schema::ApiConfig;
use crate::error::MatrixResult;
use crate::http::executor::HttpExecutor;
use crate::http::path;
use crate::http::request::PreparedRequest;
use crate::session::SessionContext;

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    #[serde(default)]
    versions: Vec<String>,
}

/// `GET /_matrix/client/versions` on the context's home server.
pub fn fetch_versions(executor: &HttpExecutor, ctx: &SessionContext) -> MatrixResult<Vec<String>> {
    let url = path::homeserver_url(ctx, "client", "", "versions")?;
    let body = executor.execute_required(&PreparedRequest::get(url))?;
    let response: VersionsResponse = serde_json::from_str(&body)?;
    Ok(response.versions)
}

/// Check the context's identity server. Valid only if the body is exactly `{}`.
pub fn validate_identity_server(
    executor: &HttpExecutor,
    ctx: &SessionContext,
    api: &ApiConfig,
) -> MatrixResult<bool> {
    let url = path::identity_url(ctx, "identity", &api.identity_version, &api.identity_check_path)?;
    let body = executor.execute_required(&PreparedRequest::get(url))?;
    Ok(body == "{}")
}
