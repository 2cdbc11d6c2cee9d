//! Content hashing using blake3.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string (for debugging/display).
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars are plenty for log output
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Compute blake3 hash of file contents.
///
/// Streams in 64KB chunks to avoid loading large assets into memory.
/// Returns `None` if the file cannot be read.
pub fn compute_file_hash(path: &Path) -> Option<ContentHash> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 65536];

    loop {
        let n = reader.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Some(ContentHash::new(*hasher.finalize().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_same_content_same_hash() {
        let temp = tempfile::TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "identical").unwrap();
        fs::write(&b, "identical").unwrap();

        assert_eq!(compute_file_hash(&a), compute_file_hash(&b));
    }

    #[test]
    fn test_different_content_different_hash() {
        let temp = tempfile::TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "one").unwrap();
        fs::write(&b, "two").unwrap();

        assert_ne!(compute_file_hash(&a), compute_file_hash(&b));
    }

    #[test]
    fn test_missing_file_is_none() {
        assert!(compute_file_hash(Path::new("/definitely/not/here")).is_none());
    }

    #[test]
    fn test_hex_display() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert_eq!(format!("{hash}"), "abababababababab");
    }
}
