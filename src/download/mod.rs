//! Download module containing everything that describes a single download.
//!
//! # Overview
//!
//! - [`task`] - the [`DownloadTask`] and its request settings
//! - [`headers`] - parsing of user supplied `Key: Value` headers
//! - [`partition`] - splitting a resource into byte ranges
//! - [`verify`] - size and MD5 verification of the finished file
//! - [`summary`] - the outcome of a finished task
//!
//! # Examples
//!
//! ## Creating a task
//!
//! ```rust
//! use pdl::download::{headers::parse_headers, DownloadTask};
//! use reqwest::Url;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let url = Url::parse("https://example.com/file.zip")?;
//! let task = DownloadTask::new(&url, "downloads/file.zip")
//!     .headers(parse_headers("Referer: https://example.com")?)
//!     .workers(4)
//!     .max_attempts(3);
//! # Ok(())
//! # }
//! ```

pub mod headers;
pub mod partition;
pub mod summary;
pub mod task;
pub mod verify;

pub use partition::{partition, ByteRange};
pub use summary::Summary;
pub use task::DownloadTask;
pub use verify::{verify, Verdict, Verification};
