//! Persistence of the downloaded archive

use async_trait::async_trait;
use std::path::Path;

/// Filesystem operations the updater needs for the temporary archive
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create or truncate `path` and write `bytes` to it
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;

    /// Delete the file at `path`
    async fn remove(&self, path: &Path) -> std::io::Result<()>;

    /// Create `path` and any missing parents
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;
}

/// [`FileStore`] on the local filesystem
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileStore;

#[async_trait]
impl FileStore for LocalFileStore {
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(path, bytes).await
    }

    async fn remove(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }
}
