//! Parsing of user supplied request headers.
//!
//! Headers are given as `Key: Value` lines. Blank lines and lines starting
//! with `#` are ignored.
//!
//! ```rust
//! use pdl::download::headers::parse_headers;
//!
//! let headers = parse_headers("Referer: https://example.com\nCookie: a=1; b=2")?;
//! assert_eq!(headers["cookie"], "a=1; b=2");
//! # Ok::<(), pdl::Error>(())
//! ```

use crate::error::{Error, Result};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Parse a single `Key: Value` header line.
pub fn parse_header(line: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeader(format!("missing ':' in \"{}\"", line)))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidHeader(format!("empty name in \"{}\"", line)));
    }

    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::InvalidHeader(format!("\"{}\": {}", name, e)))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|e| Error::InvalidHeader(format!("\"{}\": {}", name, e)))?;

    Ok((name, value))
}

/// Parse a block of newline separated header lines.
///
/// Later lines overwrite earlier ones with the same name.
pub fn parse_headers(text: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, value) = parse_header(line)?;
        headers.insert(name, value);
    }
    Ok(headers)
}
