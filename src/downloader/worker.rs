//! Fetching of a single partition.

use super::config::WriteMode;
use super::file::SharedFile;
use crate::download::ByteRange;
use crate::error::{Error, Result};
use crate::progress::Progress;

use futures::StreamExt;
use indicatif::ProgressBar;
use reqwest::header::{HeaderMap, HeaderValue, RANGE};
use reqwest::{StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound of the memory reserved up front for a buffered partition.
const BUFFER_RESERVE: u64 = 8 * 1024 * 1024;

enum AttemptError {
    Cancelled,
    Failed(String),
}

/// Downloads partitions of one task into the shared destination file.
///
/// Each call to [`Worker::fetch`] runs a bounded attempt loop around the
/// request-and-stream step. Progress is credited against a high-water mark,
/// so bytes received again by a later attempt are not counted twice and the
/// bytes credited for a partition never exceed its length.
#[derive(Clone)]
pub struct Worker {
    client: ClientWithMiddleware,
    url: Url,
    headers: HeaderMap,
    file: SharedFile,
    progress: Progress,
    max_attempts: u32,
    retry_delay: Duration,
    write_mode: WriteMode,
    cancel: Option<Arc<AtomicBool>>,
}

impl Worker {
    /// Create a worker for `url`, writing into `file` and crediting `progress`.
    ///
    /// `headers` are copied; the caller's map is never modified.
    pub fn new(
        client: ClientWithMiddleware,
        url: &Url,
        headers: &HeaderMap,
        file: SharedFile,
        progress: Progress,
    ) -> Self {
        Self {
            client,
            url: url.clone(),
            headers: headers.clone(),
            file,
            progress,
            max_attempts: 1,
            retry_delay: Duration::ZERO,
            write_mode: WriteMode::default(),
            cancel: None,
        }
    }

    /// Set the total number of attempts per partition.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the base pause between attempts.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// Share a cancellation flag with sibling workers.
    ///
    /// A worker that exhausts its attempts raises the flag; the others stop
    /// between two chunks.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Fetch partition `index` covering `range` and write it at `range.start`.
    ///
    /// Returns the number of bytes written.
    pub async fn fetch(&self, index: usize, range: ByteRange, pb: &ProgressBar) -> Result<u64> {
        if range.is_empty() {
            return Ok(0);
        }

        let mut credited = 0;
        let mut reason = String::new();

        for attempt in 1..=self.max_attempts {
            if self.is_cancelled() {
                return Err(Error::Cancelled(index));
            }

            debug!(partition = index, attempt, "Fetching {}", range);
            match self.attempt(range, &mut credited, pb).await {
                Ok(written) => {
                    debug!(partition = index, "Wrote {} bytes at offset {}", written, range.start);
                    return Ok(written);
                }
                Err(AttemptError::Cancelled) => return Err(Error::Cancelled(index)),
                Err(AttemptError::Failed(why)) => {
                    warn!(
                        partition = index,
                        attempt,
                        max_attempts = self.max_attempts,
                        "Attempt failed: {}",
                        why
                    );
                    reason = why;
                }
            }

            if attempt < self.max_attempts && !self.retry_delay.is_zero() {
                tokio::time::sleep(backoff(self.retry_delay, attempt)).await;
            }
        }

        if let Some(flag) = &self.cancel {
            flag.store(true, Ordering::Relaxed);
        }

        Err(Error::PartitionFailed {
            index,
            range,
            attempts: self.max_attempts,
            reason,
        })
    }

    async fn attempt(
        &self,
        range: ByteRange,
        credited: &mut u64,
        pb: &ProgressBar,
    ) -> std::result::Result<u64, AttemptError> {
        let header = range
            .header_value()
            .and_then(|v| HeaderValue::from_str(&v).ok())
            .ok_or_else(|| AttemptError::Failed(format!("invalid range {}", range)))?;
        let mut headers = self.headers.clone();
        headers.insert(RANGE, header);

        let res = self
            .client
            .get(self.url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| AttemptError::Failed(e.to_string()))?;

        // A server ignoring the range answers 200 with the whole body, which
        // only lines up with a partition starting at 0.
        let status = res.status();
        let accepted = status == StatusCode::PARTIAL_CONTENT
            || (status == StatusCode::OK && range.start == 0);
        if !accepted {
            return Err(AttemptError::Failed(format!("HTTP {}", status)));
        }

        let expected = range.len();
        let mut received: u64 = 0;
        let mut buffer = match self.write_mode {
            WriteMode::Buffered => Vec::with_capacity(expected.min(BUFFER_RESERVE) as usize),
            WriteMode::Streaming => Vec::new(),
        };

        let mut stream = res.bytes_stream();
        while let Some(item) = stream.next().await {
            if self.is_cancelled() {
                return Err(AttemptError::Cancelled);
            }

            let chunk = item.map_err(|e| AttemptError::Failed(e.to_string()))?;
            let len = chunk.len() as u64;
            if received + len > expected {
                return Err(AttemptError::Failed(format!(
                    "body exceeds the range ({} bytes expected)",
                    expected
                )));
            }

            match self.write_mode {
                WriteMode::Buffered => buffer.extend_from_slice(&chunk),
                WriteMode::Streaming => self
                    .file
                    .write_at(range.start + received, &chunk)
                    .await
                    .map_err(|e| AttemptError::Failed(io_reason(e)))?,
            }
            received += len;

            if received > *credited {
                let delta = received - *credited;
                self.progress.add(delta);
                pb.inc(delta);
                *credited = received;
            }
        }

        if received != expected {
            return Err(AttemptError::Failed(format!(
                "body ended after {} of {} bytes",
                received, expected
            )));
        }

        if self.write_mode == WriteMode::Buffered {
            self.file
                .write_at(range.start, &buffer)
                .await
                .map_err(|e| AttemptError::Failed(io_reason(e)))?;
        }

        Ok(received)
    }
}

/// Pause before the attempt following attempt number `attempt`.
fn backoff(retry_delay: Duration, attempt: u32) -> Duration {
    retry_delay.saturating_mul(attempt)
}

fn io_reason(error: Error) -> String {
    match error {
        Error::IOError { source } => format!("write failed: {}", source),
        other => other.to_string(),
    }
}
