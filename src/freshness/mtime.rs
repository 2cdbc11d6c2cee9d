//! Mtime helpers.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file.
///
/// Returns `None` if the file doesn't exist or mtime cannot be read.
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_get_mtime_missing() {
        assert!(get_mtime(Path::new("/nope/nothing")).is_none());
    }

    #[test]
    fn test_get_mtime_present() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("f");
        fs::write(&path, "x").unwrap();
        assert!(get_mtime(&path).is_some());
    }
}
