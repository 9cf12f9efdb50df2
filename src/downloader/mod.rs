//! Downloader module containing the coordinator, its workers, builder and configuration.
//!
//! # Overview
//!
//! - `downloader` - the [`Downloader`] driving a task from probe to verification
//! - `builder` - [`DownloaderBuilder`] for configuring it
//! - `config` - configuration structures and callback types
//! - `probe` - discovery of the size and checksum of a resource
//! - `worker` - the attempt loop fetching one partition
//! - `file` - the destination file shared by all workers
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use pdl::downloader::DownloaderBuilder;
//! use pdl::download::DownloadTask;
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DownloaderBuilder::new().build();
//! let task = DownloadTask::try_from("https://example.com/file1.zip")?;
//! let summary = downloader.download(&task).await?;
//! assert!(summary.is_complete());
//! # Ok(())
//! # }
//! ```
//!
//! ## Hidden Progress Bars
//!
//! ```rust
//! use pdl::downloader::DownloaderBuilder;
//!
//! let downloader = DownloaderBuilder::hidden().build();
//! ```

pub mod builder;
pub mod config;
#[allow(clippy::module_inception)]
pub mod downloader;
pub mod file;
pub mod probe;
pub mod worker;

pub use builder::DownloaderBuilder;
pub use config::{DownloadCallback, DownloaderConfig, WriteMode};
pub use downloader::Downloader;
pub use file::SharedFile;
pub use probe::{probe, probe_with_range, Metadata};
pub use worker::Worker;
