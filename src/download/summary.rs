//! Download outcome reporting.
//!
//! A [`Summary`] is produced once every partition of a task has terminated
//! and the file has been verified.
//!
//! ```rust
//! use pdl::download::{DownloadTask, Summary, Verdict};
//! use pdl::history::HistoryStatus;
//! use std::convert::TryFrom;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let task = DownloadTask::try_from("https://example.com/file.zip")?;
//! let summary = Summary::new(task, 2048, 2048, Verdict::Unknown, Duration::from_secs(1));
//!
//! assert!(summary.is_complete());
//! assert_eq!(summary.history_status(), HistoryStatus::Ok);
//! # Ok(())
//! # }
//! ```

use super::task::DownloadTask;
use super::verify::Verdict;
use crate::history::HistoryStatus;

use std::time::Duration;

/// Represents a finished [`DownloadTask`].
#[derive(Debug, Clone)]
pub struct Summary {
    task: DownloadTask,
    total_size: u64,
    size_on_disk: u64,
    verdict: Verdict,
    elapsed: Duration,
}

impl Summary {
    /// Create a new [`Summary`].
    pub fn new(
        task: DownloadTask,
        total_size: u64,
        size_on_disk: u64,
        verdict: Verdict,
        elapsed: Duration,
    ) -> Self {
        Self {
            task,
            total_size,
            size_on_disk,
            verdict,
            elapsed,
        }
    }

    /// Get a reference to the summary's task.
    pub fn task(&self) -> &DownloadTask {
        &self.task
    }

    /// Size reported by the server.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Size of the destination file after the download.
    pub fn size_on_disk(&self) -> u64 {
        self.size_on_disk
    }

    /// Checksum comparison result.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Wall clock time spent on the task.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the file on disk has the size announced by the server.
    pub fn is_complete(&self) -> bool {
        self.size_on_disk == self.total_size
    }

    /// Average throughput in bytes per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.size_on_disk as f64 / secs
        } else {
            0.0
        }
    }

    /// Status stored in the download history.
    ///
    /// Only the size comparison decides it. A checksum mismatch on a complete
    /// file is reported through [`Summary::verdict`] and does not turn the
    /// record into an error.
    pub fn history_status(&self) -> HistoryStatus {
        if self.is_complete() {
            HistoryStatus::Ok
        } else {
            HistoryStatus::Error
        }
    }
}
