//! File name extraction from URLs.

use crate::error::Error;

use reqwest::Url;

/// Extract the file name from the last path segment of `url`.
///
/// The segment is percent-decoded. The query string is ignored.
///
/// ```rust
/// use pdl::utils::filename_from_url;
/// use reqwest::Url;
///
/// let url = Url::parse("https://example.com/a/b/setup%20v2.exe?sig=abc")?;
/// assert_eq!(filename_from_url(&url)?, "setup v2.exe");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn filename_from_url(url: &Url) -> Result<String, Error> {
    url.path_segments()
        .ok_or_else(|| {
            Error::InvalidUrl(format!("The url \"{}\" does not contain a valid path", url))
        })?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            form_urlencoded::parse(segment.as_bytes())
                .map(|(key, val)| [key, val].concat())
                .collect()
        })
        .ok_or_else(|| {
            Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", url))
        })
}
