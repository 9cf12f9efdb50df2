//! Configuration structures and defaults for the downloader.
//!
//! These are the knobs of the coordinator itself. What is specific to one
//! download (URL, destination, headers, partitions, attempts) lives on the
//! [`DownloadTask`](crate::download::DownloadTask).

use crate::download::Summary;
use crate::history::HistoryStore;
use crate::StyleOptions;

use std::sync::Arc;
use std::time::Duration;

/// Callback type for download completion events
pub type DownloadCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// How a worker moves a partition's bytes to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Keep the whole partition in memory and write it with a single
    /// positioned write once the body is complete.
    #[default]
    Buffered,
    /// Write each chunk at its offset as soon as it arrives. Peak memory no
    /// longer grows with the partition size.
    Streaming,
}

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Downloader style options.
    pub style_options: StyleOptions,
    /// Pause before attempt `n + 1` of a partition is `retry_delay * n`.
    pub retry_delay: Duration,
    /// How partitions are written to disk.
    pub write_mode: WriteMode,
    /// Stop the sibling partitions as soon as one partition fails.
    pub fail_fast: bool,
    /// Use range requests to get content length instead of HEAD requests.
    pub use_range_for_content_length: bool,
    /// Transient-failure retries of the metadata request.
    pub probe_retries: u32,
    /// Interval at which the progress bar polls the shared counter.
    pub poll_interval: Duration,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Ledger receiving one record per finished task.
    pub history: Option<Arc<HistoryStore>>,
    /// Callback for when a download has been verified.
    pub on_complete: Option<Arc<DownloadCallback>>,
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("style_options", &self.style_options)
            .field("retry_delay", &self.retry_delay)
            .field("write_mode", &self.write_mode)
            .field("fail_fast", &self.fail_fast)
            .field(
                "use_range_for_content_length",
                &self.use_range_for_content_length,
            )
            .field("probe_retries", &self.probe_retries)
            .field("poll_interval", &self.poll_interval)
            .field("proxy", &self.proxy)
            .field("history", &self.history.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            style_options: StyleOptions::default(),
            retry_delay: Duration::from_millis(500),
            write_mode: WriteMode::Buffered,
            fail_fast: false,
            use_range_for_content_length: false,
            probe_retries: 2,
            poll_interval: Duration::from_millis(100),
            proxy: None,
            history: None,
            on_complete: None,
        }
    }
}
