//! Freshness detection for cached step results.
//!
//! Two signals are available:
//! - **mtime**: cheap, fine for local editing workflows
//! - **content hash** (blake3): robust against tools that rewrite files
//!   with identical content or mangle timestamps
//!
//! The project config picks one mode; cache entries store the fingerprint
//! they were computed with, so mixing modes simply reads as "stale".

mod hash;
mod mtime;

pub use hash::ContentHash;

use hash::compute_file_hash;
use mtime::get_mtime;

use std::path::Path;
use std::time::SystemTime;

use serde::Deserialize;

/// Which signal to fingerprint inputs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    #[default]
    Mtime,
    Hash,
}

/// Cheap content signal for one file at one point in time.
///
/// Equality means "unchanged"; a `Missing` fingerprint never equals a
/// present one, so deleted files read as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fingerprint {
    Mtime { mtime: SystemTime, len: u64 },
    Hash(ContentHash),
    Missing,
}

impl Fingerprint {
    /// Fingerprint a file with the configured mode.
    pub fn of(path: &Path, mode: FingerprintMode) -> Self {
        match mode {
            FingerprintMode::Mtime => {
                let (Some(mtime), Ok(meta)) = (get_mtime(path), path.metadata()) else {
                    return Self::Missing;
                };
                Self::Mtime {
                    mtime,
                    len: meta.len(),
                }
            }
            FingerprintMode::Hash => match compute_file_hash(path) {
                Some(hash) => Self::Hash(hash),
                None => Self::Missing,
            },
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_mtime_fingerprint_stable_for_unchanged_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("a.md");
        fs::write(&path, "hello").unwrap();

        let first = Fingerprint::of(&path, FingerprintMode::Mtime);
        let second = Fingerprint::of(&path, FingerprintMode::Mtime);
        assert_eq!(first, second);
        assert!(!first.is_missing());
    }

    #[test]
    fn test_hash_fingerprint_tracks_content() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("a.md");
        fs::write(&path, "hello").unwrap();

        let before = Fingerprint::of(&path, FingerprintMode::Hash);
        fs::write(&path, "changed").unwrap();
        let after = Fingerprint::of(&path, FingerprintMode::Hash);

        assert_ne!(before, after);
    }

    #[test]
    fn test_missing_file_never_fresh() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("gone.md");

        let fp = Fingerprint::of(&path, FingerprintMode::Mtime);
        assert!(fp.is_missing());
        assert_eq!(Fingerprint::of(&path, FingerprintMode::Hash), Fingerprint::Missing);
    }
}
