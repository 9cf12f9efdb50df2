//! Content length extraction utilities.
//!
//! This module reads the size and checksum of a resource from the headers of
//! a `HEAD` response, or from the `Content-Range` header of a ranged `GET`.

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE};

/// Name of the header carrying the MD5 digest of the body.
pub const CONTENT_MD5: &str = "content-md5";

/// Read the `Content-Length` header.
///
/// The header is read directly rather than through the body size hint,
/// which is always zero for `HEAD` responses.
///
/// ```rust
/// use pdl::utils::header_content_length;
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1024"));
/// assert_eq!(header_content_length(&headers), Some(1024));
/// ```
pub fn header_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Read the total size from the `Content-Range` header of a partial response.
pub fn header_content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
}

/// Read the `Content-MD5` header, if any.
pub fn header_content_md5(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_MD5)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total"
/// An unknown total (`*`) yields `None`.
///
/// # Example
///
/// ```rust
/// use pdl::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.split_once('/')?;
    total.trim().parse::<u64>().ok()
}
