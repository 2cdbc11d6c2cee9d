//! The `clean` command: remove everything the engine generated.

use std::fs;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::log;

/// Remove the output directory and the cache sidecar. Source files are
/// never touched.
pub fn run_clean(config: &Config) -> Result<()> {
    let mut removed = 0;

    for dir in [config.output_dir(), config.cache_dir()] {
        if !dir.exists() {
            continue;
        }
        fs::remove_dir_all(&dir)
            .with_context(|| format!("failed to remove `{}`", dir.display()))?;
        log!("clean"; "removed {}", dir.display());
        removed += 1;
    }

    if removed == 0 {
        log!("clean"; "nothing to remove");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_output_and_cache() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::with_root(temp.path());

        fs::create_dir_all(config.output_dir().join("nested")).unwrap();
        fs::write(config.output_dir().join("nested/a.html"), "x").unwrap();
        fs::create_dir_all(config.cache_dir()).unwrap();
        fs::write(config.root.join("a.md"), "source").unwrap();

        run_clean(&config).unwrap();

        assert!(!config.output_dir().exists());
        assert!(!config.cache_dir().exists());
        assert!(config.root.join("a.md").exists());
    }

    #[test]
    fn test_clean_on_fresh_project_is_noop() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::with_root(temp.path());
        run_clean(&config).unwrap();
    }
}
