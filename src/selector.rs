//! Archive selection among the links found on the download page

use crate::error::Result;
use crate::extension::{extension, suffix_after};
use regex::Regex;
use tracing::debug;

/// Extension a link must carry to be considered at all
pub const ZIP_EXTENSION: &str = ".zip";

/// Compiled archive-name pattern.
///
/// The default pattern for an addon named `elvui` is `elvui-[^/]+\.zip$`,
/// matched anywhere in the link so leading path components are tolerated.
/// Matching is case-sensitive.
#[derive(Clone, Debug)]
pub struct ArchivePattern {
    regex: Regex,
}

impl ArchivePattern {
    /// Compile a custom pattern
    ///
    /// # Errors
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) if the
    /// pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        // Size limit guards against user-supplied patterns with huge DFAs
        let regex = regex::RegexBuilder::new(pattern)
            .size_limit(1024 * 1024)
            .build()?;
        Ok(Self { regex })
    }

    /// Pattern matching `<addon_name>-<version>.zip`
    pub fn for_addon(addon_name: &str) -> Result<Self> {
        Self::new(&default_pattern(addon_name))
    }

    /// Whether `link` contains a match
    pub fn is_match(&self, link: &str) -> bool {
        self.regex.is_match(link)
    }

    /// The source text of the pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Default archive-name regex for `addon_name`
pub fn default_pattern(addon_name: &str) -> String {
    format!(r"{}-[^/]+\.zip$", regex::escape(addon_name))
}

/// A link together with what the selector derived from it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// The href as found on the page
    pub link: &'a str,
    /// Result of the extension classifier
    pub extension: &'a str,
    /// Whether the link matches the archive-name pattern
    pub matches_pattern: bool,
}

impl<'a> Candidate<'a> {
    /// Classify a single link against `pattern`
    pub fn classify(link: &'a str, pattern: &ArchivePattern) -> Self {
        Self {
            link,
            extension: extension(link, b'.'),
            matches_pattern: pattern.is_match(link),
        }
    }

    /// Whether the link ends in exactly `.zip`
    pub fn is_zip(&self) -> bool {
        self.extension == ZIP_EXTENSION
    }

    /// The last path segment of the link
    pub fn file_name(&self) -> &'a str {
        suffix_after(self.link, b'/')
    }
}

/// Links whose extension is exactly `.zip`, in input order
pub fn zip_candidates<S: AsRef<str>>(links: &[S]) -> Vec<&str> {
    links
        .iter()
        .map(|link| link.as_ref())
        .filter(|link| extension(link, b'.') == ZIP_EXTENSION)
        .collect()
}

/// Select the archive to download.
///
/// Keeps only `.zip` links, then returns the first one matching `pattern`.
/// `None` means no link qualifies; that ends a run normally.
///
/// ```
/// use addon_updater::selector::{ArchivePattern, find_archive};
///
/// let pattern = ArchivePattern::for_addon("elvui").unwrap();
/// let links = ["foo.zip", "elvui-11.27.zip", "bar/elvui-11.27.zip"];
/// assert_eq!(find_archive(&links, &pattern), Some("elvui-11.27.zip"));
/// ```
pub fn find_archive<'a, S: AsRef<str>>(links: &'a [S], pattern: &ArchivePattern) -> Option<&'a str> {
    let candidates: Vec<Candidate<'a>> = links
        .iter()
        .map(|link| Candidate::classify(link.as_ref(), pattern))
        .filter(Candidate::is_zip)
        .collect();

    debug!(
        possible_archives = ?candidates.iter().map(|c| c.link).collect::<Vec<_>>(),
        pattern = pattern.as_str(),
        "filtered zip candidates"
    );

    candidates
        .into_iter()
        .find(|c| c.matches_pattern)
        .map(|c| c.link)
}
