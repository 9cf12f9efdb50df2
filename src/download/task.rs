//! Description of a single download.
//!
//! A [`DownloadTask`] names the resource, where it lands on disk and how it
//! is fetched: the request headers, the number of parallel partitions and
//! how many attempts each partition gets.
//!
//! ```rust
//! use pdl::download::DownloadTask;
//! use std::convert::TryFrom;
//!
//! let task = DownloadTask::try_from("https://example.com/files/archive.tar.gz")?
//!     .workers(8)
//!     .max_attempts(5);
//! assert_eq!(task.filename(), "archive.tar.gz");
//! assert_eq!(task.worker_count(), 8);
//! # Ok::<(), pdl::Error>(())
//! ```

use crate::error::Error;
use crate::utils::filename::filename_from_url;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Url;
use std::convert::TryFrom;
use std::env::current_dir;
use std::path::{Path, PathBuf};

/// Default number of parallel partitions.
pub const DEFAULT_WORKERS: usize = 5;
/// Default number of attempts per partition.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Represents a file to be downloaded.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// URL of the file to download.
    pub url: Url,
    /// Path of the file on disk.
    pub destination: PathBuf,
    headers: HeaderMap,
    workers: usize,
    max_attempts: u32,
}

impl DownloadTask {
    /// Creates a new [`DownloadTask`] saving `url` to `destination`.
    pub fn new(url: &Url, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.clone(),
            destination: destination.into(),
            headers: HeaderMap::new(),
            workers: DEFAULT_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Creates a task saving the file, named after the URL, into `directory`.
    pub fn in_directory(url: &Url, directory: &Path) -> Result<Self, Error> {
        let filename = filename_from_url(url)?;
        Ok(Self::new(url, directory.join(filename)))
    }

    /// Set the number of parallel partitions. Values below 1 are raised to 1.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the number of attempts per partition. Values below 1 are raised to 1.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Merge `headers` into the request headers of the task.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Add a single request header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Request headers sent with every request of the task.
    pub fn request_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Number of parallel partitions.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Number of attempts per partition.
    pub fn attempts(&self) -> u32 {
        self.max_attempts
    }

    /// File name component of the destination.
    pub fn filename(&self) -> String {
        self.destination
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl TryFrom<&Url> for DownloadTask {
    type Error = crate::error::Error;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        DownloadTask::in_directory(value, &current_dir()?)
    }
}

impl TryFrom<&str> for DownloadTask {
    type Error = crate::error::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Url::parse(value)
            .map_err(|e| {
                Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e))
            })
            .and_then(|u| DownloadTask::try_from(&u))
    }
}
