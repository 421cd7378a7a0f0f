//! Installed vs. available version comparison
//!
//! Versions are opaque tokens compared by exact string equality. There is no
//! semantic-version parsing: `11.27` and `11.270` are different versions, and
//! so are `1.0` and `01.0`. Formatting drift between the download page and
//! the installed manifest therefore always reads as "update needed".

use crate::extension::suffix_after;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

/// Marker identifying the version line in a manifest
pub const VERSION_MARKER: &str = "Version";

/// An opaque version string
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of comparing the installed version with the available archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionCheck {
    /// Installed version equals the available one; nothing to do
    Current(VersionToken),
    /// Installed version differs from the available one
    Differs {
        /// Version found in the local manifest
        installed: VersionToken,
        /// Version taken from the archive filename
        available: VersionToken,
    },
    /// No manifest, or no version line in it; treated as a first install
    NotInstalled {
        /// Version taken from the archive filename
        available: VersionToken,
    },
}

impl VersionCheck {
    /// Whether the archive should be downloaded and extracted
    pub fn needs_update(&self) -> bool {
        !matches!(self, VersionCheck::Current(_))
    }

    /// The version that would be installed
    pub fn available(&self) -> &VersionToken {
        match self {
            VersionCheck::Current(v) => v,
            VersionCheck::Differs { available, .. } | VersionCheck::NotInstalled { available } => {
                available
            }
        }
    }
}

/// Read the installed version from manifest lines.
///
/// The first line containing `Version` is the declaration; its last
/// whitespace-separated token is the version. Returns `Ok(None)` when no
/// such line exists. Lines are split on raw bytes, so a manifest with
/// non-UTF-8 text (e.g. a Latin-1 `Title`) is still readable.
pub fn read_installed_version<R: BufRead>(reader: R) -> std::io::Result<Option<VersionToken>> {
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        if line.contains(VERSION_MARKER) {
            return Ok(line.split_whitespace().next_back().map(VersionToken::new));
        }
    }
    Ok(None)
}

/// Read the installed version from the manifest file at `manifest`.
///
/// A missing or unreadable manifest is not an error: it means there is no
/// local version and the addon should be installed.
pub async fn installed_version(manifest: &Path) -> Option<VersionToken> {
    let contents = match tokio::fs::read(manifest).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(?manifest, "manifest not found, treating addon as not installed");
            return None;
        }
        Err(e) => {
            warn!(?manifest, error = %e, "cannot read manifest, treating addon as not installed");
            return None;
        }
    };

    match read_installed_version(contents.as_slice()) {
        Ok(Some(version)) => {
            debug!(?manifest, %version, "found installed version");
            Some(version)
        }
        Ok(None) => {
            warn!(?manifest, "manifest has no {} line", VERSION_MARKER);
            None
        }
        Err(e) => {
            warn!(?manifest, error = %e, "failed to read manifest");
            None
        }
    }
}

/// Version token carried by an archive filename.
///
/// Takes the text after the last `-` and strips one trailing `.zip`:
/// `elvui-11.27.zip` gives `11.27`. Any leading path is ignored.
pub fn remote_version(archive_name: &str) -> VersionToken {
    let file_name = suffix_after(archive_name, b'/');
    let last = suffix_after(file_name, b'-');
    VersionToken::new(last.strip_suffix(".zip").unwrap_or(last))
}

/// Compare an optional installed version with the available one
pub fn compare_versions(installed: Option<VersionToken>, available: VersionToken) -> VersionCheck {
    match installed {
        None => VersionCheck::NotInstalled { available },
        Some(installed) if installed == available => VersionCheck::Current(installed),
        Some(installed) => VersionCheck::Differs {
            installed,
            available,
        },
    }
}

/// Compare the manifest at `manifest` with the version in `archive_name`
pub async fn check_version(manifest: &Path, archive_name: &str) -> VersionCheck {
    compare_versions(installed_version(manifest).await, remote_version(archive_name))
}
