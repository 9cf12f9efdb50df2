use pdl::progress::{ProgressBarOpts, StyleOptions};
use pdl::{DownloadTask, DownloaderBuilder, HistoryStore};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// Common test constants
pub const TEST_DOMAIN: &str = "http://domain.com/file.zip";
pub const TEST_USER_AGENT: &str = "pdl-test-agent";

/// "Hello, World!" digests, as hex and as base64 of the raw bytes.
pub const HELLO_MD5_HEX: &str = "65a8e27d8879283831b664bd8b7f0ad4";
pub const HELLO_MD5_BASE64: &str = "ZajifYh5KDgxtmS9i38K1A==";

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i * 31 % 251) as u8).collect()
}

/// Hex MD5 of `content`.
pub fn md5_hex(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}

/// Asserts that a file has the expected content
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let content = fs::read(path).expect("Failed to read file");
    assert_eq!(content.len(), expected.len(), "File size mismatch at path: {:?}", path);
    assert!(content == expected, "File content mismatch at path: {:?}", path);
}

/// Asserts that a file has the expected size
pub fn assert_file_size(path: &Path, expected_size: u64) {
    let metadata = fs::metadata(path).expect("Failed to get file metadata");
    assert_eq!(
        metadata.len(),
        expected_size,
        "File size mismatch at path: {:?}",
        path
    );
}

// === Task Helpers ===

/// Creates a test task from the common test domain
pub fn create_test_task() -> DownloadTask {
    DownloadTask::try_from(TEST_DOMAIN).expect("Failed to create test task")
}

/// Creates a task saving `url` into `dir`.
pub fn create_task_in(url: &Url, dir: &Path, workers: usize) -> DownloadTask {
    DownloadTask::in_directory(url, dir)
        .expect("Failed to create task")
        .workers(workers)
}

/// Creates test headers with common user agent
pub fn create_test_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(TEST_USER_AGENT));
    headers
}

// === Progress Bar Helpers ===

/// Creates disabled style options for testing
pub fn create_disabled_style_options() -> StyleOptions {
    StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
}

// === Downloader Builder Helpers ===

/// A hidden downloader which retries immediately and never retries probes.
pub fn create_fast_downloader_builder() -> DownloaderBuilder {
    DownloaderBuilder::hidden()
        .retry_delay(Duration::ZERO)
        .probe_retries(0)
}

/// An in-memory history.
pub fn create_history() -> Arc<HistoryStore> {
    Arc::new(HistoryStore::open_in_memory().expect("Failed to open history"))
}
