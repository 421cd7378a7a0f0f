//! Update pipeline
//!
//! ```text
//! FetchIndex -> SelectArchive -> CompareVersion -> FetchArchive -> Extract -> Cleanup
//!                    |                 |
//!                 NotFound       AlreadyCurrent
//! ```
//!
//! Fetch and extraction failures end the run with an error and nothing is
//! retried. A failed cleanup only produces a warning; the addon is already
//! in place at that point.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extension::suffix_after;
use crate::extraction::extract_archive;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::links::extract_links;
use crate::selector::{ArchivePattern, find_archive};
use crate::storage::{FileStore, LocalFileStore};
use crate::version::{VersionCheck, VersionToken, check_version, remote_version};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// Pipeline stage, used in log output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Downloading the page that lists the archives
    FetchIndex,
    /// Picking the archive link
    SelectArchive,
    /// Comparing installed and available versions
    CompareVersion,
    /// Downloading the archive
    FetchArchive,
    /// Unpacking the archive
    Extract,
    /// Deleting the downloaded archive
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchIndex => "fetch_index",
            Stage::SelectArchive => "select_archive",
            Stage::CompareVersion => "compare_version",
            Stage::FetchArchive => "fetch_archive",
            Stage::Extract => "extract",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// How a successful run ended
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The archive was downloaded and extracted
    Updated {
        /// Link the archive was selected from
        archive: String,
        /// Version that is now installed
        version: VersionToken,
        /// Paths written by the extraction, in archive order
        files: Vec<PathBuf>,
        /// Set when the downloaded archive could not be deleted
        cleanup_warning: Option<String>,
    },
    /// The installed version already matches the available archive
    AlreadyCurrent {
        /// The installed version
        version: VersionToken,
    },
    /// No link on the page matched the archive pattern
    NotFound,
}

/// Runs the update pipeline against injected fetch and storage backends
pub struct Updater<F = HttpFetcher, S = LocalFileStore> {
    config: Config,
    pattern: ArchivePattern,
    base_url: Url,
    fetcher: F,
    store: S,
}

impl Updater {
    /// Create an updater using HTTP and the local filesystem
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        Self::with_backends(config, fetcher, LocalFileStore)
    }
}

impl<F: Fetcher, S: FileStore> Updater<F, S> {
    /// Create an updater with custom backends
    pub fn with_backends(config: Config, fetcher: F, store: S) -> Result<Self> {
        config.validate()?;
        let pattern = config.archive_pattern()?;
        let base_url = config.base_url()?;
        Ok(Self {
            config,
            pattern,
            base_url,
            fetcher,
            store,
        })
    }

    /// The configuration this updater runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline starting from the index page
    pub async fn run(&self) -> Result<UpdateOutcome> {
        info!(stage = %Stage::FetchIndex, url = %self.config.index_url, "fetching download page");
        let index = self.fetcher.fetch(&self.config.index_url).await?;
        let links = extract_links(&index.text());
        debug!(link_count = links.len(), "collected links");

        self.run_with_links(&links).await
    }

    /// Run the pipeline from an already collected list of links
    pub async fn run_with_links<L: AsRef<str>>(&self, links: &[L]) -> Result<UpdateOutcome> {
        let Some(archive) = find_archive(links, &self.pattern) else {
            info!(
                stage = %Stage::SelectArchive,
                pattern = self.pattern.as_str(),
                "archive pattern not found, nothing to do"
            );
            return Ok(UpdateOutcome::NotFound);
        };
        let archive_name = suffix_after(archive, b'/');
        info!(stage = %Stage::SelectArchive, archive, "found archive");

        let version = if self.config.check_version {
            let manifest = self.config.manifest_file();
            match check_version(&manifest, archive_name).await {
                VersionCheck::Current(version) => {
                    info!(stage = %Stage::CompareVersion, %version, "addon is already up to date");
                    return Ok(UpdateOutcome::AlreadyCurrent { version });
                }
                VersionCheck::Differs {
                    installed,
                    available,
                } => {
                    info!(
                        stage = %Stage::CompareVersion,
                        %installed,
                        %available,
                        "addon is out of date"
                    );
                    available
                }
                VersionCheck::NotInstalled { available } => {
                    info!(
                        stage = %Stage::CompareVersion,
                        %available,
                        "no installed version found, installing"
                    );
                    available
                }
            }
        } else {
            debug!(stage = %Stage::CompareVersion, "version check disabled");
            remote_version(archive_name)
        };

        let archive_path = self.download(archive, archive_name).await?;

        let dest = self.config.extract_dir();
        info!(stage = %Stage::Extract, archive = ?archive_path, ?dest, "extracting");
        let files = extract_archive(&archive_path, &dest).await?;

        let cleanup_warning = self.cleanup(&archive_path).await;

        info!(%version, files = files.len(), "update complete");
        Ok(UpdateOutcome::Updated {
            archive: archive.to_string(),
            version,
            files,
            cleanup_warning,
        })
    }

    /// Download the selected archive and persist it, returning its path
    async fn download(&self, archive: &str, archive_name: &str) -> Result<PathBuf> {
        let url = self.base_url.join(archive).map_err(|e| Error::InvalidUrl {
            url: archive.to_string(),
            reason: e.to_string(),
        })?;

        info!(stage = %Stage::FetchArchive, url = %url, "downloading archive");
        let body = self.fetcher.fetch(url.as_str()).await?;
        info!(url = %body.final_url, size = body.bytes.len(), "archive downloaded");

        let download_dir = self.config.download_dir();
        let archive_path = download_dir.join(archive_file_name(&body.final_url, archive_name));

        self.store
            .create_dir_all(download_dir)
            .await
            .map_err(|e| io_context(e, "failed to create download directory", download_dir))?;
        self.store
            .write(&archive_path, &body.bytes)
            .await
            .map_err(|e| io_context(e, "failed to write archive", &archive_path))?;

        debug!(path = ?archive_path, "archive saved");
        Ok(archive_path)
    }

    /// Delete the downloaded archive; failures are reported, not raised
    async fn cleanup(&self, archive_path: &Path) -> Option<String> {
        debug!(stage = %Stage::Cleanup, path = ?archive_path, "removing downloaded archive");
        match self.store.remove(archive_path).await {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    path = ?archive_path,
                    error = %e,
                    "could not delete downloaded archive, manual cleanup required"
                );
                Some(format!(
                    "could not delete {}: {}",
                    archive_path.display(),
                    e
                ))
            }
        }
    }
}

/// Name used when neither the final URL nor the selected link yields a usable file name
const DEFAULT_ARCHIVE_NAME: &str = "addon.zip";

/// File name for the saved archive: the last path segment of the URL the
/// archive was served from, else `fallback`, else [`DEFAULT_ARCHIVE_NAME`].
///
/// A name is only used when it is a single plain path component, so the
/// result always joins to a file directly inside the download directory.
fn archive_file_name(final_url: &str, fallback: &str) -> String {
    let segment = match Url::parse(final_url) {
        Ok(url) => suffix_after(url.path(), b'/').to_string(),
        Err(_) => suffix_after(final_url, b'/').to_string(),
    };
    if is_plain_file_name(&segment) {
        segment
    } else if is_plain_file_name(fallback) {
        fallback.to_string()
    } else {
        warn!(final_url, fallback, "no usable archive file name, using default");
        DEFAULT_ARCHIVE_NAME.to_string()
    }
}

/// True when `name` parses to exactly one normal path component
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn io_context(e: std::io::Error, what: &str, path: &Path) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("{} {}: {}", what, path.display(), e),
    ))
}
