//! HTTP module containing HTTP client functionality.
//!
//! - [`client`] - client creation with tracing, retry and proxy middleware

pub mod client;

pub use client::{create_http_client, HttpClientConfig};
