//! Configuration types for addon-updater

use crate::error::{Error, Result};
use crate::fetch::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::selector::{ArchivePattern, default_pattern};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main configuration for an update run
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration that updates ElvUI from tukui.org into the standard
/// retail `Interface` directory.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Config {
    /// Addon name used to build the default archive pattern (default: "elvui")
    #[serde(default = "default_addon_name")]
    pub addon_name: String,

    /// Regex selecting the archive link, overriding `<addon_name>-<version>.zip`
    #[serde(default)]
    pub archive_pattern: Option<String>,

    /// Page listing the download links
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Base for resolving the selected link (default: `index_url`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Game `Interface` directory
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,

    /// Extraction destination, relative to `install_dir` (default: "AddOns")
    #[serde(default = "default_addons_subdir")]
    pub addons_subdir: PathBuf,

    /// Installed manifest, relative to `install_dir` (default: "AddOns/ElvUI/ElvUI.toc")
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Where the archive is saved before extraction (default: `install_dir`)
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Skip the download when the installed version matches (default: true)
    #[serde(default = "default_true")]
    pub check_version: bool,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addon_name: default_addon_name(),
            archive_pattern: None,
            index_url: default_index_url(),
            base_url: None,
            install_dir: default_install_dir(),
            addons_subdir: default_addons_subdir(),
            manifest_path: default_manifest_path(),
            download_dir: None,
            check_version: true,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Config {
    /// Load a configuration file.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    /// The result is validated before it is returned.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: Config = if is_json {
            serde_json::from_str(&text).map_err(|e| Error::Config {
                message: format!("invalid JSON in {}: {}", path.display(), e),
                key: None,
            })?
        } else {
            toml::from_str(&text).map_err(|e| Error::Config {
                message: format!("invalid TOML in {}: {}", path.display(), e),
                key: None,
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        if self.addon_name.trim().is_empty() {
            return Err(config_error("addon_name must not be empty", "addon_name"));
        }
        parse_http_url(&self.index_url, "index_url")?;
        if let Some(base) = &self.base_url {
            parse_http_url(base, "base_url")?;
        }
        if self.addons_subdir.as_os_str().is_empty() {
            return Err(config_error("addons_subdir must not be empty", "addons_subdir"));
        }
        if self.manifest_path.as_os_str().is_empty() {
            return Err(config_error("manifest_path must not be empty", "manifest_path"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(config_error(
                "fetch_timeout_secs must be greater than zero",
                "fetch_timeout_secs",
            ));
        }
        self.archive_pattern().map_err(|e| Error::Config {
            message: e.to_string(),
            key: Some("archive_pattern".to_string()),
        })?;
        Ok(())
    }

    /// Directory the archive is extracted into
    pub fn extract_dir(&self) -> PathBuf {
        self.install_dir.join(&self.addons_subdir)
    }

    /// Installed manifest file
    pub fn manifest_file(&self) -> PathBuf {
        self.install_dir.join(&self.manifest_path)
    }

    /// Directory the downloaded archive is written to
    pub fn download_dir(&self) -> &Path {
        self.download_dir.as_deref().unwrap_or(&self.install_dir)
    }

    /// Compiled archive pattern
    pub fn archive_pattern(&self) -> Result<ArchivePattern> {
        match &self.archive_pattern {
            Some(pattern) => ArchivePattern::new(pattern),
            None => ArchivePattern::new(&default_pattern(&self.addon_name)),
        }
    }

    /// URL that selected links are resolved against
    pub fn base_url(&self) -> Result<Url> {
        match &self.base_url {
            Some(base) => parse_http_url(base, "base_url"),
            None => parse_http_url(&self.index_url, "index_url"),
        }
    }

    /// Per-request timeout
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

fn parse_http_url(value: &str, key: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| Error::Config {
        message: format!("{} is not a valid URL ({}): {}", key, value, e),
        key: Some(key.to_string()),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config {
            message: format!("{} must use http or https, got {}", key, other),
            key: Some(key.to_string()),
        }),
    }
}

fn default_addon_name() -> String {
    "elvui".to_string()
}

fn default_index_url() -> String {
    "https://www.tukui.org/download.php?ui=elvui".to_string()
}

#[cfg(windows)]
fn default_install_dir() -> PathBuf {
    PathBuf::from(r"C:\Program Files (x86)\World of Warcraft\_retail_\Interface")
}

#[cfg(not(windows))]
fn default_install_dir() -> PathBuf {
    PathBuf::from("Interface")
}

fn default_addons_subdir() -> PathBuf {
    PathBuf::from("AddOns")
}

fn default_manifest_path() -> PathBuf {
    ["AddOns", "ElvUI", "ElvUI.toc"].iter().collect()
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}
