//! Shared utility functions.
//!
//! This module contains helpers used across the crate:
//!
//! - [`content_length`] - size and checksum extraction from response headers
//! - [`filename`] - file name extraction from URLs

pub mod content_length;
pub mod filename;

pub use content_length::{
    header_content_length, header_content_md5, header_content_range_total,
    parse_content_range_total,
};
pub use filename::filename_from_url;
