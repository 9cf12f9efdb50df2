//! Discovery of the size and checksum of a resource.

use crate::error::{Error, Result};
use crate::utils::content_length::{
    header_content_length, header_content_md5, header_content_range_total,
};

use reqwest::header::{HeaderMap, HeaderValue, RANGE};
use reqwest::{Response, StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use tracing::debug;

/// What the server told us about a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Size of the resource in bytes.
    pub total_size: u64,
    /// Value of the `Content-MD5` header, when present.
    pub checksum: Option<String>,
}

fn unreachable(url: &Url, reason: impl std::fmt::Display) -> Error {
    Error::UnreachableResource {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

fn ensure_success(url: &Url, res: &Response) -> Result<()> {
    if res.status().is_success() {
        Ok(())
    } else {
        Err(unreachable(url, format!("HTTP {}", res.status())))
    }
}

/// Probe the resource with a `HEAD` request.
pub async fn probe(
    client: &ClientWithMiddleware,
    url: &Url,
    headers: &HeaderMap,
) -> Result<Metadata> {
    debug!("Probing {} with HEAD", url);
    let res = client
        .head(url.clone())
        .headers(headers.clone())
        .send()
        .await
        .map_err(|e| unreachable(url, e))?;
    ensure_success(url, &res)?;

    let total_size =
        header_content_length(res.headers()).ok_or_else(|| Error::MissingLength(url.to_string()))?;

    Ok(Metadata {
        total_size,
        checksum: header_content_md5(res.headers()),
    })
}

/// Probe the resource by requesting its first byte.
///
/// Useful for servers that answer `HEAD` poorly. The total is read from
/// `Content-Range`; a server ignoring the range answers `200` with the full
/// body, whose `Content-Length` and `Content-MD5` are used instead. The body
/// is never read.
pub async fn probe_with_range(
    client: &ClientWithMiddleware,
    url: &Url,
    headers: &HeaderMap,
) -> Result<Metadata> {
    debug!("Probing {} with a one byte range request", url);
    let mut headers = headers.clone();
    headers.insert(RANGE, HeaderValue::from_static("bytes=0-0"));

    let res = client
        .get(url.clone())
        .headers(headers)
        .send()
        .await
        .map_err(|e| unreachable(url, e))?;
    ensure_success(url, &res)?;

    let metadata = match res.status() {
        StatusCode::PARTIAL_CONTENT => Metadata {
            total_size: header_content_range_total(res.headers())
                .ok_or_else(|| Error::MissingLength(url.to_string()))?,
            checksum: None,
        },
        _ => Metadata {
            total_size: header_content_length(res.headers())
                .ok_or_else(|| Error::MissingLength(url.to_string()))?,
            checksum: header_content_md5(res.headers()),
        },
    };
    Ok(metadata)
}
