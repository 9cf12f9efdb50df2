//! Error handling for the pdl library.
//!
//! Transient network failures are retried inside the partition workers and
//! never reach the caller directly. What is left are structural failures
//! (the resource could not be probed, a partition exhausted its attempts, a
//! history page does not exist) plus the wrapped errors of the crates pdl is
//! built on.

use std::io;
use thiserror::Error;

use crate::download::partition::ByteRange;

/// Errors that can happen when using pdl.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// This variant captures internal errors that don't fit into other categories,
    /// typically representing unexpected system-level failures.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A custom header could not be parsed into a name/value pair.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The metadata or range request could not be completed.
    ///
    /// Covers connection failures as well as non-success HTTP statuses.
    #[error("Unreachable resource {url}: {reason}")]
    UnreachableResource { url: String, reason: String },

    /// The server did not report the size of the resource.
    ///
    /// The byte range cannot be partitioned without it, so this is never retried.
    #[error("The server did not report a content length for {0}")]
    MissingLength(String),

    /// One partition exhausted all of its attempts.
    #[error("Partition #{index} ({range}) failed after {attempts} attempt(s): {reason}")]
    PartitionFailed {
        index: usize,
        range: ByteRange,
        attempts: u32,
        reason: String,
    },

    /// The worker stopped because a sibling partition failed.
    #[error("Partition #{0} was cancelled")]
    Cancelled(usize),

    /// A history page beyond the available page count was requested.
    #[error("Page {page} is out of range (1-{pages})")]
    OutOfRange { page: u64, pages: u64 },

    /// The persisted settings are invalid.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// I/O Error.
    ///
    /// This variant wraps standard I/O errors that can occur during file operations,
    /// such as creating, writing, or reading files during the download process.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error from the HTTP middleware stack.
    #[error("Middleware Error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// Error from the history database.
    #[error("Database error")]
    Database {
        #[from]
        source: rusqlite::Error,
    },

    /// The settings file could not be parsed.
    #[error("Settings parse error")]
    SettingsParse {
        #[from]
        source: toml::de::Error,
    },

    /// The settings could not be serialized.
    #[error("Settings serialization error")]
    SettingsSerialize {
        #[from]
        source: toml::ser::Error,
    },
}

/// Result type alias for operations that can fail with a pdl error.
pub type Result<T> = std::result::Result<T, Error>;
