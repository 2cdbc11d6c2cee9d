//! Path normalization utilities.
//!
//! The pipeline keys everything (routes, cache entries, reports) by paths
//! relative to the project root. These helpers keep the conversion between
//! absolute watcher/walker paths and project-relative paths in one place.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Compute the project-relative form of an absolute path.
///
/// Returns `None` if the path does not live under `root`.
pub fn relative_to(root: &Path, path: &Path) -> Option<PathBuf> {
    path.strip_prefix(root).ok().map(Path::to_path_buf)
}

/// First path component as a string, if representable.
///
/// Used for reserved-directory checks on project-relative paths.
pub fn first_component(rel: &Path) -> Option<&str> {
    rel.components().next().and_then(|c| match c {
        Component::Normal(name) => name.to_str(),
        _ => None,
    })
}
