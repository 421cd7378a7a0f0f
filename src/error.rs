//! Error types for addon-updater
//!
//! Every fatal condition of an update run maps to one variant of [`Error`].
//! Conditions that end a run normally (no matching archive, addon already
//! current, failed cleanup of the temporary archive) are not errors; they are
//! reported through [`UpdateOutcome`](crate::updater::UpdateOutcome).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for addon-updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for addon-updater
///
/// Each variant carries the URL, path, or archive entry needed to diagnose
/// the failure without re-running the update.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "index_url")
        key: Option<String>,
    },

    /// Transport failure or a response status other than 200
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// The URL that was requested
        url: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// A discovered link could not be turned into a download URL
    #[error("invalid download URL {url}: {reason}")]
    InvalidUrl {
        /// The href or URL that failed to resolve
        url: String,
        /// Parser error
        reason: String,
    },

    /// The archive name pattern is not a valid regular expression
    #[error("invalid archive pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The archive is missing, unreadable, or not a zip file
    #[error("cannot open archive {archive}: {reason}")]
    ArchiveOpen {
        /// The archive that failed to open
        archive: PathBuf,
        /// The reason the archive could not be opened
        reason: String,
    },

    /// An archive entry would be written outside the destination directory
    #[error("illegal file path {path} for archive entry {entry:?}")]
    PathTraversal {
        /// The entry name as stored in the archive
        entry: String,
        /// The resolved path that escaped the destination
        path: PathBuf,
    },

    /// Filesystem failure while writing an archive entry
    #[error("failed to extract {path}: {source}")]
    ExtractionIo {
        /// The destination path being written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Machine-readable error code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Fetch { .. } => "fetch_error",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::InvalidPattern(_) => "invalid_pattern",
            Error::ArchiveOpen { .. } => "archive_open_error",
            Error::PathTraversal { .. } => "path_traversal",
            Error::ExtractionIo { .. } => "extraction_io_error",
            Error::Io(_) => "io_error",
            Error::TaskFailed(_) => "task_failed",
        }
    }

    /// Shorthand for an extraction I/O failure at `path`
    pub(crate) fn extraction_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ExtractionIo {
            path: path.into(),
            source,
        }
    }
}
