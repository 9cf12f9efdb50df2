//! The destination file shared by the workers of a task.

use crate::error::Result;

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

/// Handle on the destination file of a task.
///
/// The coordinator creates (and truncates) the file and closes it once the
/// workers are done. Workers only get [`SharedFile::write_at`]; every
/// positioned write holds the lock from seek to flush, so writes from
/// different workers never interleave on the shared file description.
#[derive(Debug, Clone)]
pub struct SharedFile {
    inner: Arc<Mutex<File>>,
}

impl SharedFile {
    /// Create the file, and its parent directories, truncating any previous content.
    pub async fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            debug!("Creating destination directory {:?}", parent);
            fs::create_dir_all(parent).await?;
        }

        debug!("Creating destination file {:?}", path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await?;

        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }

    /// Write `bytes` starting at `offset`.
    pub async fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut file = self.inner.lock().await;
        file.seek(SeekFrom::Start(offset)).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    /// Flush the file to disk.
    pub async fn sync(&self) -> Result<()> {
        let file = self.inner.lock().await;
        file.sync_all().await?;
        Ok(())
    }
}
