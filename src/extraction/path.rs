//! Lexical path handling for archive entries

use std::path::{Component, Path, PathBuf};

/// Lexically normalize `path`.
///
/// Drops `.` components and resolves `..` against the preceding component
/// without touching the filesystem. `..` directly under the root stays at the
/// root; leading `..` on a relative path is kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::ParentDir) | Some(Component::CurDir) | None => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Resolve an archive entry name against `dest`.
///
/// Returns the cleaned path when it lies strictly below the cleaned `dest`,
/// or `None` when the entry would land on or outside it (`..` segments,
/// absolute names, drive prefixes). Comparison is per path component, so
/// `dest-evil/` is not mistaken for a child of `dest/`.
pub fn resolve_entry_path(dest: &Path, entry_name: &str) -> Option<PathBuf> {
    let root = clean_path(dest);
    let candidate = clean_path(&dest.join(entry_name));

    if candidate != root && candidate.starts_with(&root) {
        Some(candidate)
    } else {
        None
    }
}
