use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::path::resolve_entry_path;

/// Mode used for files whose entry carries no Unix mode
#[cfg(unix)]
const DEFAULT_FILE_MODE: u32 = 0o666;

/// Archive extractor for ZIP files
pub struct ZipExtractor;

impl ZipExtractor {
    /// Extract every entry of the ZIP archive at `archive_path` into `dest_path`.
    ///
    /// Entries are processed in central-directory order. Each entry's resolved
    /// path must lie strictly inside `dest_path`; the first entry that would
    /// escape aborts the whole extraction with [`Error::PathTraversal`]. Files
    /// written before a failure stay on disk.
    ///
    /// Returns the written paths (directories and files) in archive order.
    /// The paths are absolute and lexically normalized.
    pub fn extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "attempting ZIP extraction");

        let file = File::open(archive_path).map_err(|e| Error::ArchiveOpen {
            archive: archive_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::ArchiveOpen {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to read ZIP archive: {}", e),
        })?;

        let dest = std::path::absolute(dest_path).map_err(|e| Error::extraction_io(dest_path, e))?;
        std::fs::create_dir_all(&dest).map_err(|e| Error::extraction_io(&dest, e))?;

        let mut written = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(|e| Error::ArchiveOpen {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to read ZIP entry {}: {}", i, e),
            })?;

            let out_path = match resolve_entry_path(&dest, entry.name()) {
                Some(path) => path,
                None => {
                    let err = Error::PathTraversal {
                        entry: entry.name().to_string(),
                        path: dest.join(entry.name()),
                    };
                    warn!(
                        ?archive_path,
                        entry = entry.name(),
                        already_written = written.len(),
                        "rejecting archive entry outside destination"
                    );
                    return Err(err);
                }
            };

            Self::extract_entry(entry, &out_path)?;
            written.push(out_path);
        }

        info!(
            ?archive_path,
            ?dest,
            extracted_count = written.len(),
            "ZIP extraction successful"
        );

        Ok(written)
    }

    /// Write a single entry to `out_path`.
    ///
    /// Takes the entry by value so it and the output file are both closed
    /// when this returns.
    fn extract_entry(mut entry: zip::read::ZipFile<'_>, out_path: &Path) -> Result<()> {
        if entry.is_dir() {
            debug!(path = ?out_path, "creating directory");
            std::fs::create_dir_all(out_path).map_err(|e| Error::extraction_io(out_path, e))?;
            return Ok(());
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::extraction_io(parent, e))?;
        }

        let mut outfile =
            open_output(out_path, entry.unix_mode()).map_err(|e| Error::extraction_io(out_path, e))?;

        let bytes = std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| Error::extraction_io(out_path, e))?;

        debug!(path = ?out_path, bytes, "extracted file");
        Ok(())
    }
}

/// Create or truncate `path`, applying the stored permission bits on Unix
#[cfg(unix)]
fn open_output(path: &Path, mode: Option<u32>) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode.map_or(DEFAULT_FILE_MODE, |m| m & 0o777))
        .open(path)
}

#[cfg(not(unix))]
fn open_output(path: &Path, _mode: Option<u32>) -> std::io::Result<File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
