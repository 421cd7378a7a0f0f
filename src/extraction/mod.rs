//! Archive extraction with path-escape protection
//!
//! Entry names are untrusted. Every entry is resolved against the destination
//! and rejected if it would land outside it, before anything is written for
//! that entry.

mod path;
mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

// Re-exports
pub use path::{clean_path, resolve_entry_path};
pub use zip::ZipExtractor;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::info;

/// Extract the ZIP archive at `archive_path` into `dest_path` on the blocking
/// thread pool.
///
/// Same contract as [`ZipExtractor::extract`]: fails fast on the first bad
/// entry and leaves earlier entries in place.
///
/// # Example
/// ```no_run
/// use addon_updater::extraction::extract_archive;
/// use std::path::Path;
///
/// # async fn example() -> addon_updater::Result<()> {
/// let files = extract_archive(Path::new("elvui-11.27.zip"), Path::new("Interface/AddOns")).await?;
/// println!("Extracted {} entries", files.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_archive(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
    info!(?archive_path, ?dest_path, "extracting archive");

    let archive_owned = archive_path.to_path_buf();
    let dest_owned = dest_path.to_path_buf();

    spawn_blocking(move || ZipExtractor::extract(&archive_owned, &dest_owned))
        .await
        .map_err(|e| Error::TaskFailed(format!("extraction task failed: {}", e)))?
}
