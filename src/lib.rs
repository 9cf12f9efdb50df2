//! pdl is a crate downloading one file over HTTP(S) with several parallel
//! range requests, verifying it and keeping a history of what was fetched.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pdl::{DownloadTask, DownloaderBuilder, Error};
//! use std::convert::TryFrom;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let reqwest_rs = "https://github.com/seanmonstar/reqwest/archive/refs/tags/v0.11.9.zip";
//! let task = DownloadTask::try_from(reqwest_rs)?.workers(4);
//! let downloader = DownloaderBuilder::new().build();
//! let summary = downloader.download(&task).await?;
//! println!("{} ({})", summary.task().filename(), summary.verdict());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - the `DownloadTask`, byte range partitioning, verification and summaries
//! - [`downloader`] - the `Downloader`, its workers and the `DownloaderBuilder`
//! - [`error`] - centralized error handling with the `Error` enum
//! - [`history`] - the SQLite ledger of finished downloads
//! - [`http`] - HTTP client construction
//! - [`progress`] - the shared progress counter and its terminal display
//! - [`settings`] - persistent user defaults
//! - [`utils`] - shared utility functions

pub mod download;
pub mod downloader;
pub mod error;
pub mod history;
pub mod http;
pub mod progress;
pub mod settings;
pub mod utils;

pub use download::headers::{parse_header, parse_headers};
pub use download::{partition, ByteRange, DownloadTask, Summary, Verdict};
pub use downloader::{Downloader, DownloaderBuilder, WriteMode};
pub use error::{Error, Result};
pub use history::{HistoryRecord, HistoryStatus, HistoryStore, NewRecord};
pub use http::{create_http_client, HttpClientConfig};
pub use progress::{Progress, ProgressBarOpts, StyleOptions};
pub use settings::Settings;
