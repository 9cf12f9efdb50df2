//! Orchestration of one download task.
//!
//! A task goes through `Initialized → Probing → Downloading → Verifying →
//! Completed`:
//!
//! 1. the destination file is created (or truncated) before anything else;
//! 2. the resource is probed for its size and checksum, and the byte range
//!    is partitioned;
//! 3. one worker per partition is spawned on the runtime, all sharing the
//!    destination file and the progress counter;
//! 4. once *every* worker has terminated the progress poller is stopped, the
//!    file is synced and verified;
//! 5. the outcome is recorded in the history, when one is attached.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pdl::{DownloadTask, DownloaderBuilder};
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DownloaderBuilder::new().build();
//! let task = DownloadTask::try_from("https://example.com/file.iso")?.workers(8);
//!
//! let summary = downloader.download(&task).await?;
//! println!("{} bytes, checksum {}", summary.size_on_disk(), summary.verdict());
//! # Ok(())
//! # }
//! ```

use super::config::{DownloaderConfig, WriteMode};
use super::file::SharedFile;
use super::probe::{probe, probe_with_range, Metadata};
use super::worker::Worker;
use crate::download::verify::{verify, Verification};
use crate::download::{partition, DownloadTask, Summary, Verdict};
use crate::error::{Error, Result};
use crate::history::record::{format_size, now, NewRecord};
use crate::history::HistoryStatus;
use crate::http::{create_http_client, HttpClientConfig};
use crate::progress::{Progress, ProgressDisplay};

use chrono::NaiveDateTime;
use futures::future::join_all;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::fmt::Debug;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main()  {
/// use pdl::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build();
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
}

impl Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Gets the base pause between partition attempts.
    pub fn retry_delay(&self) -> std::time::Duration {
        self.config.retry_delay
    }

    /// Gets how partitions are written to disk.
    pub fn write_mode(&self) -> WriteMode {
        self.config.write_mode
    }

    /// Gets whether a failed partition stops its siblings.
    pub fn fail_fast(&self) -> bool {
        self.config.fail_fast
    }

    /// Gets whether to use range requests for content length.
    pub fn use_range_for_content_length(&self) -> bool {
        self.config.use_range_for_content_length
    }

    /// Gets the number of retries of the metadata request.
    pub fn probe_retries(&self) -> u32 {
        self.config.probe_retries
    }

    /// Gets whether finished tasks are recorded.
    pub fn records_history(&self) -> bool {
        self.config.history.is_some()
    }

    /// Download `task` with a fresh progress counter.
    pub async fn download(&self, task: &DownloadTask) -> Result<Summary> {
        self.download_with_progress(task, Progress::new()).await
    }

    /// Download `task`, crediting received bytes to `progress`.
    ///
    /// `progress` must be fresh: a counter is never reset, so one that has
    /// already counted bytes is rejected.
    ///
    /// Probe failures are returned before any worker is spawned. A partition
    /// that exhausts its attempts makes the task fail with
    /// [`Error::PartitionFailed`], but only after all other partitions have
    /// terminated; the partially written file is left on disk.
    pub async fn download_with_progress(
        &self,
        task: &DownloadTask,
        progress: Progress,
    ) -> Result<Summary> {
        if progress.downloaded() != 0 {
            return Err(Error::Internal(
                "the progress counter already belongs to another task".into(),
            ));
        }

        let start_time = now();
        let result = self.run(task, &progress).await;

        match &result {
            Ok(summary) => {
                self.record(NewRecord::from_summary(summary, start_time))
                    .await;
                if let Some(ref callback) = self.config.on_complete {
                    callback(summary);
                }
            }
            Err(e) => {
                error!("Download of {} failed: {}", task.url, e);
                self.record_failure(task, start_time).await;
            }
        }

        result
    }

    fn clients(&self) -> Result<(ClientWithMiddleware, ClientWithMiddleware)> {
        let probe_client = create_http_client(HttpClientConfig {
            retries: self.config.probe_retries,
            proxy: self.config.proxy.clone(),
            ..HttpClientConfig::default()
        })?;
        let fetch_client = create_http_client(HttpClientConfig {
            retries: 0,
            proxy: self.config.proxy.clone(),
            ..HttpClientConfig::default()
        })?;
        Ok((probe_client, fetch_client))
    }

    async fn run(&self, task: &DownloadTask, progress: &Progress) -> Result<Summary> {
        let started = Instant::now();
        let (probe_client, fetch_client) = self.clients()?;

        // Initialized: the destination exists and is empty from here on.
        let file = SharedFile::create(&task.destination).await?;

        // Probing.
        let Metadata {
            total_size,
            checksum,
        } = if self.config.use_range_for_content_length {
            probe_with_range(&probe_client, &task.url, task.request_headers()).await?
        } else {
            probe(&probe_client, &task.url, task.request_headers()).await?
        };
        progress.set_total(total_size);
        let ranges = partition(total_size, task.worker_count());
        info!(
            "Downloading {} ({} bytes) with {} partition(s)",
            task.url,
            total_size,
            ranges.len()
        );

        // Downloading.
        let mut display = ProgressDisplay::new(self.config.style_options.clone());
        display.start(
            progress.clone(),
            &task.filename(),
            self.config.poll_interval,
        );

        let mut worker = Worker::new(
            fetch_client,
            &task.url,
            task.request_headers(),
            file.clone(),
            progress.clone(),
        )
        .max_attempts(task.attempts())
        .retry_delay(self.config.retry_delay)
        .write_mode(self.config.write_mode);
        if self.config.fail_fast {
            worker = worker.cancel_flag(Arc::new(AtomicBool::new(false)));
        }

        let handles = ranges.into_iter().enumerate().map(|(index, range)| {
            let worker = worker.clone();
            let pb = display.create_partition_progress(range.len());
            tokio::spawn(async move {
                let result = worker.fetch(index, range, &pb).await;
                (result, pb)
            })
        });
        let results = join_all(handles.collect::<Vec<_>>()).await;

        // Verifying.
        let mut failure: Option<Error> = None;
        for joined in results {
            let outcome = match joined {
                Ok((result, pb)) => {
                    display.finish_partition(&pb);
                    result
                }
                Err(e) => Err(Error::Internal(format!("worker panicked: {}", e))),
            };
            if let Err(e) = outcome {
                warn!("{}", e);
                failure = Some(pick_failure(failure, e));
            }
        }
        display.finish(progress);

        let synced = file.sync().await;
        drop(worker);
        drop(file);

        let path = task.destination.clone();
        let verification = match synced {
            Ok(()) => tokio::task::spawn_blocking(move || {
                verify(&path, total_size, checksum.as_deref())
            })
            .await
            .map_err(|e| Error::Internal(format!("verification panicked: {}", e)))
            .and_then(|verified| verified),
            Err(e) => Err(e),
        };
        let verification = settle(failure, verification)?;

        debug!(
            "Verified {:?}: {} of {} bytes, checksum {}",
            task.destination, verification.local_size, total_size, verification.verdict
        );

        match verification.verdict {
            Verdict::Match => info!("{} downloaded, MD5 matches", task.filename()),
            Verdict::Mismatch => warn!(
                "{} downloaded but its MD5 does not match the server checksum",
                task.filename()
            ),
            Verdict::Unknown => info!(
                "{} downloaded, the server provided no checksum",
                task.filename()
            ),
        }

        // Completed.
        Ok(Summary::new(
            task.clone(),
            total_size,
            verification.local_size,
            verification.verdict,
            started.elapsed(),
        ))
    }

    async fn record(&self, record: NewRecord) {
        let Some(history) = self.config.history.clone() else {
            return;
        };
        let filename = record.filename.clone();
        let added = tokio::task::spawn_blocking(move || history.add(&record))
            .await
            .map_err(|e| Error::Internal(format!("history insert panicked: {}", e)))
            .and_then(|added| added);
        if let Err(e) = added {
            warn!("Could not record {} in the history: {}", filename, e);
        }
    }

    async fn record_failure(&self, task: &DownloadTask, start_time: NaiveDateTime) {
        if self.config.history.is_none() {
            return;
        }
        let size_on_disk = tokio::fs::metadata(&task.destination)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        self.record(NewRecord {
            filename: task.filename(),
            url: task.url.to_string(),
            status: HistoryStatus::Error,
            start_time,
            end_time: now(),
            size: format_size(size_on_disk),
        })
        .await;
    }
}

/// A partition failure takes precedence over any error raised while
/// syncing or verifying the partial file.
fn settle(failure: Option<Error>, verification: Result<Verification>) -> Result<Verification> {
    match (failure, verification) {
        (Some(e), Err(late)) => {
            debug!("Ignoring verification error after a failed partition: {}", late);
            Err(e)
        }
        (Some(e), Ok(_)) => Err(e),
        (None, verification) => verification,
    }
}

/// Keep the most telling error: a real partition failure wins over the
/// cancellations it caused, and the lowest partition index wins among equals.
fn pick_failure(current: Option<Error>, new: Error) -> Error {
    match current {
        None => new,
        Some(current) => match (&current, &new) {
            (Error::Cancelled(_), Error::PartitionFailed { .. }) => new,
            (Error::PartitionFailed { index: a, .. }, Error::PartitionFailed { index: b, .. })
                if b < a =>
            {
                new
            }
            _ => current,
        },
    }
}
