//! Builder pattern implementation for creating Downloader instances.
//!
//! # Examples
//!
//! ```rust
//! use pdl::downloader::{DownloaderBuilder, WriteMode};
//! use pdl::history::HistoryStore;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), pdl::Error> {
//! let history = Arc::new(HistoryStore::open_in_memory()?);
//! let downloader = DownloaderBuilder::new()
//!     .retry_delay(Duration::from_secs(1))
//!     .write_mode(WriteMode::Streaming)
//!     .history(history)
//!     .on_complete(|summary| {
//!         println!("{} -> {}", summary.task().filename(), summary.verdict());
//!     })
//!     .build();
//! # Ok(())
//! # }
//! ```

use super::config::{DownloaderConfig, WriteMode};
use super::downloader::Downloader;
use crate::download::Summary;
use crate::history::HistoryStore;
use crate::{ProgressBarOpts, StyleOptions};

use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main()  {
/// use pdl::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().fail_fast(true).build();
/// # }
/// ```
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Convenience function to hide the progress bars.
    pub fn hidden() -> Self {
        let mut builder = DownloaderBuilder::default();
        builder.config.style_options =
            StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden());
        builder
    }

    /// Set the downloader style options.
    pub fn style_options(mut self, style_options: StyleOptions) -> Self {
        self.config.style_options = style_options;
        self
    }

    /// Set the base pause between two attempts of a partition.
    ///
    /// The pause grows linearly with the attempt number. Zero disables it.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    /// Set how partitions are written to disk.
    pub fn write_mode(mut self, write_mode: WriteMode) -> Self {
        self.config.write_mode = write_mode;
        self
    }

    /// Stop sibling partitions as soon as one partition exhausts its attempts.
    ///
    /// Off by default: siblings run to completion and their data is kept.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Use range requests to get content length instead of HEAD requests.
    ///
    /// This is useful when servers don't provide accurate Content-Length headers
    /// in HEAD requests but do support range requests with Content-Range responses.
    pub fn use_range_for_content_length(mut self, use_range: bool) -> Self {
        self.config.use_range_for_content_length = use_range;
        self
    }

    /// Set the number of transient-failure retries of the metadata request.
    pub fn probe_retries(mut self, retries: u32) -> Self {
        self.config.probe_retries = retries;
        self
    }

    /// Set how often the progress bar reads the shared counter.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Route every request through `proxy`.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Record every finished task in `history`.
    pub fn history(mut self, history: Arc<HistoryStore>) -> Self {
        self.config.history = Some(history);
        self
    }

    /// Set callback for when a download has been verified.
    ///
    /// Failed downloads are reported through the returned error instead.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.config.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Downloader {
        Downloader::new(self.config)
    }
}
