//! Request URL construction.
//!
//! # Responsibilities
//! - Build `{base}/_matrix/{module}/{version}/{path}` from a base URL
//! - Add the `user_id` impersonation parameter in virtual mode
//! - Add the `access_token` parameter for authenticated calls
//!
//! # Design Decisions
//! - Segments go through `url`'s path API so ids like `#room:server` are escaped
//! - Empty segments are skipped: an empty version gives `/_matrix/client/versions`
//! - Missing prerequisites are caller bugs and fail with `InvalidState`

use url::Url;

use crate::error::{MatrixError, MatrixResult};
use crate::session::SessionContext;

pub const ACCESS_TOKEN_PARAM: &str = "access_token";
pub const IMPERSONATION_PARAM: &str = "user_id";

/// Build a request URL under `base`.
pub fn build_url(
    base: &Url,
    module: &str,
    version: &str,
    path: &str,
    ctx: &SessionContext,
) -> MatrixResult<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| MatrixError::invalid_state(format!("{} cannot be used as a base URL", base)))?;
        segments.pop_if_empty();
        segments.push("_matrix");
        segments.push(module);
        segments.extend(version.split('/').filter(|s| !s.is_empty()));
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
    }

    if ctx.is_virtual() {
        let user = ctx.user().ok_or_else(|| {
            MatrixError::invalid_state("virtual mode requires an acting user to be set")
        })?;
        url.query_pairs_mut()
            .append_pair(IMPERSONATION_PARAM, user.as_str());
    }

    Ok(url)
}

/// Append the context's access token to `url`.
pub fn with_access_token(mut url: Url, ctx: &SessionContext) -> MatrixResult<Url> {
    let token = ctx
        .access_token()
        .ok_or_else(|| MatrixError::invalid_state("This method can only be used with a valid token."))?;
    url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
    Ok(url)
}

/// URL on the context's home server.
pub fn homeserver_url(
    ctx: &SessionContext,
    module: &str,
    version: &str,
    path: &str,
) -> MatrixResult<Url> {
    let base = ctx
        .homeserver_url()
        .ok_or_else(|| MatrixError::invalid_state("No home server base URL is set"))?;
    build_url(base, module, version, path, ctx)
}

/// Authenticated URL on the context's home server.
pub fn authenticated_url(
    ctx: &SessionContext,
    module: &str,
    version: &str,
    path: &str,
) -> MatrixResult<Url> {
    with_access_token(homeserver_url(ctx, module, version, path)?, ctx)
}

/// URL on the context's identity server.
pub fn identity_url(
    ctx: &SessionContext,
    module: &str,
    version: &str,
    path: &str,
) -> MatrixResult<Url> {
    let base = ctx
        .identity_server_url()
        .ok_or_else(|| MatrixError::invalid_state("No identity server base URL is set"))?;
    build_url(base, module, version, path, ctx)
}
