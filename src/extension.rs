//! Extension and filename helpers for link strings
//!
//! These work on raw bytes rather than [`std::path::Path`] because the inputs
//! are URLs and hrefs, not host paths.

/// Return the extension of `s` delimited by `key`, including the delimiter.
///
/// Scans backwards from the end of `s`. ASCII alphanumeric bytes are skipped;
/// the first `key` byte ends the scan and everything from it to the end is
/// returned. Any other byte, or running out of input, yields `""`.
/// `key` must be an ASCII byte.
///
/// ```
/// use addon_updater::extension::extension;
///
/// assert_eq!(extension("/downloads/elvui-11.27.zip", b'.'), ".zip");
/// assert_eq!(extension("/download.php?ui=elvui", b'.'), "");
/// ```
pub fn extension(s: &str, key: u8) -> &str {
    debug_assert!(key.is_ascii());
    for (i, &c) in s.as_bytes().iter().enumerate().rev() {
        if c == key {
            return &s[i..];
        }
        if !c.is_ascii_alphanumeric() {
            return "";
        }
    }
    ""
}

/// Return everything strictly after the last `key` byte, or all of `s` when
/// `key` never occurs.
///
/// ```
/// use addon_updater::extension::suffix_after;
///
/// assert_eq!(suffix_after("https://host/files/elvui-11.27.zip", b'/'), "elvui-11.27.zip");
/// assert_eq!(suffix_after("elvui-11.27.zip", b'/'), "elvui-11.27.zip");
/// ```
pub fn suffix_after(s: &str, key: u8) -> &str {
    debug_assert!(key.is_ascii());
    match s.as_bytes().iter().rposition(|&c| c == key) {
        Some(i) => &s[i + 1..],
        None => s,
    }
}
