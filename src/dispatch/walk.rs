//! Project tree enumeration.
//!
//! One walk per full pass. Reserved directories are excluded here and in
//! the watcher with the same predicate, so output writes can never feed
//! back into the pipeline.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use crate::config::{CACHE_DIR, Config};
use crate::utils::path::{first_component, relative_to};

/// Directory names that never participate in a build: version-control
/// metadata and dependency-manager trees.
const RESERVED_DIRS: &[&str] = &[".git", ".hg", ".svn", ".jj", "node_modules", "target"];

/// Is this project-relative path inside a reserved directory (or the
/// output/cache sidecar)?
pub fn is_reserved(config: &Config, rel: &Path) -> bool {
    let Some(first) = first_component(rel) else {
        return true;
    };

    if RESERVED_DIRS.contains(&first) || first == CACHE_DIR {
        return true;
    }

    // Output dir is configurable and may be nested ("out/site").
    rel.starts_with(&config.build.output)
}

/// Enumerate regular files under the project root, as sorted
/// project-relative paths.
///
/// Sorting keeps pass order (and therefore report order) deterministic.
pub fn project_files(config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(&config.root)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| relative_to(&config.root, &entry.path()))
        .filter(|rel| !is_reserved(config, rel))
        .collect();

    files.sort_unstable();
    files
}
