//! HEAD probe of the remote resource.
//!
//! Confirms the resource answers 200 and extracts the headers the resume
//! decision needs: `Content-Length`, `Accept-Ranges`, `Last-Modified`.

use std::time::Duration;

use crate::error::DownloadError;
use crate::http::{self, RequestOptions, ResponseMeta};

/// Metadata a HEAD response contributes to the transfer decision.
#[derive(Debug, Clone)]
pub struct HeadInfo {
    /// Total size in bytes; `None` when absent or not numeric.
    pub content_length: Option<u64>,
    /// True iff the server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// Raw `Last-Modified` value if present.
    pub last_modified: Option<String>,
}

impl HeadInfo {
    fn from_meta(meta: &ResponseMeta) -> Self {
        Self {
            content_length: meta.header("content-length").and_then(|v| v.parse().ok()),
            accept_ranges: meta
                .header("accept-ranges")
                .is_some_and(|v| v.eq_ignore_ascii_case("bytes")),
            last_modified: meta.header("last-modified").map(str::to_string),
        }
    }
}

/// Issues the HEAD request. Any status other than 200 is a hard failure; the
/// engine never negotiates with servers that refuse HEAD.
pub async fn probe(
    url: &str,
    timeout: Option<Duration>,
    user_agent: Option<&str>,
) -> Result<HeadInfo, DownloadError> {
    let mut options = RequestOptions::head(url);
    options.timeout = timeout;
    if let Some(ua) = user_agent {
        options = options.header("User-Agent", ua);
    }

    let response = http::fetch(options)
        .await
        .map_err(|e| DownloadError::Transport(e.source))?;

    if response.meta.status != 200 {
        return Err(DownloadError::UnexpectedStatus {
            context: "HEAD",
            status: response.meta.status,
        });
    }

    Ok(HeadInfo::from_meta(&response.meta))
}
