//! Progress module: the cross-worker counter and its terminal rendering.
//!
//! # Overview
//!
//! - `counter` - [`Progress`], the shared byte counter of one task
//! - `style` - progress bar styling options
//! - `display` - the indicatif bars polling the counter
//!
//! # Examples
//!
//! ## Polling progress from another task
//!
//! ```rust,no_run
//! use pdl::{DownloadTask, DownloaderBuilder, Progress};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DownloaderBuilder::hidden().build();
//! let task = DownloadTask::try_from("https://example.com/big.iso")?;
//! let progress = Progress::new();
//!
//! let observer = progress.clone();
//! let ui = tokio::spawn(async move {
//!     loop {
//!         println!("{:.1}%", observer.fraction() * 100.0);
//!         tokio::time::sleep(Duration::from_millis(500)).await;
//!     }
//! });
//!
//! let summary = downloader.download_with_progress(&task, progress).await;
//! ui.abort();
//! # Ok(())
//! # }
//! ```

pub(crate) mod counter;
pub(crate) mod display;
pub(crate) mod style;

pub use counter::Progress;
pub use display::ProgressDisplay;
pub use style::{ProgressBarOpts, StyleOptions};
