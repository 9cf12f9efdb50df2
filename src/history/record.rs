//! History records.

use crate::download::Summary;

use chrono::{Local, NaiveDateTime, Timelike};
use indicatif::HumanBytes;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Format of the timestamps stored in the ledger.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status of a finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStatus {
    /// The file has the expected size.
    Ok,
    /// The file is incomplete or the download could not start.
    Error,
    /// Free-text status written by another tool.
    Other(String),
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryStatus::Ok => f.write_str("ok"),
            HistoryStatus::Error => f.write_str("error"),
            HistoryStatus::Other(s) => f.write_str(s),
        }
    }
}

impl FromStr for HistoryStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ok" => HistoryStatus::Ok,
            "error" => HistoryStatus::Error,
            other => HistoryStatus::Other(other.to_string()),
        })
    }
}

/// A persisted download attempt. Never modified once written.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub status: HistoryStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Human readable size, e.g. `1.50 MiB`.
    pub size: String,
}

/// Fields of a record about to be added to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub filename: String,
    pub url: String,
    pub status: HistoryStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub size: String,
}

impl NewRecord {
    /// Build the record of a task that ran through verification.
    pub fn from_summary(summary: &Summary, start_time: NaiveDateTime) -> Self {
        Self {
            filename: summary.task().filename(),
            url: summary.task().url.to_string(),
            status: summary.history_status(),
            start_time,
            end_time: now(),
            size: format_size(summary.size_on_disk()),
        }
    }
}

/// Current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Format a byte count for display in the history.
pub fn format_size(bytes: u64) -> String {
    HumanBytes(bytes).to_string()
}
