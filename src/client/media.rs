//! Media repository downloads.

use url::Url;

use crate::client::MatrixClient;
use crate::error::{MatrixError, MatrixResult};
use crate::http::path;
use crate::http::request::PreparedRequest;
use crate::http::response::ContentResult;

/// Split `mxc://{server}/{media_id}` into its parts.
pub fn parse_mxc(uri: &str) -> MatrixResult<(String, String)> {
    let invalid = || MatrixError::InvalidState(format!("{} is not a valid mxc:// URI", uri));

    let url = Url::parse(uri).map_err(|_| invalid())?;
    if url.scheme() != "mxc" {
        return Err(invalid());
    }
    let server = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
    let server = match url.port() {
        Some(port) => format!("{}:{}", server, port),
        None => server.to_string(),
    };
    let media_id = url.path().trim_start_matches('/');
    if media_id.is_empty() || media_id.contains('/') {
        return Err(invalid());
    }
    Ok((server, media_id.to_string()))
}

impl MatrixClient {
    /// Download the content behind an `mxc://` URI.
    ///
    /// A missing media item gives an invalid, empty result rather than an error.
    pub fn download_media(&self, mxc_uri: &str) -> MatrixResult<ContentResult> {
        let (server, media_id) = parse_mxc(mxc_uri)?;
        let mut url = path::homeserver_url(
            &self.context,
            "media",
            &self.api.media_version,
            &format!("download/{}/{}", server, media_id),
        )?;
        if self.context.access_token().is_some() {
            url = path::with_access_token(url, &self.context)?;
        }

        let result = self
            .executor
            .execute_content(&PreparedRequest::get(url).ignore_status(404))?;
        tracing::debug!(
            status = result.status(),
            content_type = result.content_type(),
            bytes = result.data().len(),
            "Media download finished"
        );
        Ok(result)
    }
}
