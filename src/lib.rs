//! # addon-updater
//!
//! Keeps a game addon current by scraping its vendor download page.
//!
//! An update run fetches the download page, picks the archive link matching
//! `<addon>-<version>.zip`, compares that version with the one in the
//! installed manifest, and when they differ downloads the archive and
//! unpacks it over the `AddOns` directory. Extraction refuses any entry that
//! would land outside the destination.
//!
//! ## Quick Start
//!
//! ```no_run
//! use addon_updater::{Config, UpdateOutcome, Updater};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         install_dir: "/games/wow/_retail_/Interface".into(),
//!         ..Default::default()
//!     };
//!
//!     let updater = Updater::new(config)?;
//!     match updater.run().await? {
//!         UpdateOutcome::Updated { version, .. } => println!("installed {version}"),
//!         UpdateOutcome::AlreadyCurrent { version } => println!("{version} is current"),
//!         UpdateOutcome::NotFound => println!("no archive on the page"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Extension and filename helpers
pub mod extension;
/// Archive extraction
pub mod extraction;
/// Remote content retrieval
pub mod fetch;
/// Link discovery in HTML
pub mod links;
/// Archive link selection
pub mod selector;
/// Downloaded archive persistence
pub mod storage;
/// Update pipeline
pub mod updater;
/// Version comparison
pub mod version;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use extraction::{ZipExtractor, extract_archive};
pub use fetch::{FetchedBody, Fetcher, HttpFetcher};
pub use selector::{ArchivePattern, find_archive};
pub use storage::{FileStore, LocalFileStore};
pub use updater::{Stage, UpdateOutcome, Updater};
pub use version::{VersionCheck, VersionToken};
