//! Cross-worker byte counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared progress of one download task.
///
/// Every worker of a task holds a clone and adds the length of each chunk as
/// soon as it is received. Observers poll [`Progress::downloaded`] at their
/// own pace; reads never block the workers. The counter only grows.
///
/// ```rust
/// use pdl::progress::Progress;
///
/// let progress = Progress::new();
/// progress.set_total(200);
/// let worker = progress.clone();
/// worker.add(50);
/// assert_eq!(progress.downloaded(), 50);
/// assert_eq!(progress.fraction(), 0.25);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Progress {
    downloaded: Arc<AtomicU64>,
    total: Arc<AtomicU64>,
}

impl Progress {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `bytes` more bytes received.
    pub fn add(&self, bytes: u64) {
        self.downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Bytes received so far across all workers.
    pub fn downloaded(&self) -> u64 {
        self.downloaded.load(Ordering::Relaxed)
    }

    /// Expected size of the resource, `0` until the task has been probed.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Set the expected size. Called by the downloader once the resource is probed.
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Completed share in `[0, 1]`, `0` while the total is unknown.
    pub fn fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.downloaded() as f64 / total as f64).min(1.0),
        }
    }
}
