//! URL to output-path resolution.

use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under the output root.
///
/// Directories fall back to their `index.html`. Canonicalization keeps
/// symlink and encoded-sequence traversal inside the output root.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);

    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Strip the query string, decode the path, trim slashes.
///
/// The query split happens before decoding, so an encoded `?` stays part
/// of the path.
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split('?').next().unwrap_or(url);

    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn output_root() -> tempfile::TempDir {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("posts")).unwrap();
        fs::write(temp.path().join("index.html"), "home").unwrap();
        fs::write(temp.path().join("posts/index.html"), "posts").unwrap();
        fs::write(temp.path().join("posts/one.html"), "one").unwrap();
        fs::write(temp.path().join("style.css"), "css").unwrap();
        temp
    }

    #[test]
    fn test_resolves_files_and_directory_index() {
        let root = output_root();

        let file = resolve_path("/posts/one.html", root.path()).unwrap();
        assert!(file.ends_with("posts/one.html"));

        let dir = resolve_path("/posts/", root.path()).unwrap();
        assert!(dir.ends_with("posts/index.html"));

        let home = resolve_path("/", root.path()).unwrap();
        assert!(home.ends_with("index.html"));
    }

    #[test]
    fn test_query_string_stripped() {
        let root = output_root();
        let file = resolve_path("/style.css?v=2", root.path()).unwrap();
        assert!(file.ends_with("style.css"));
    }

    #[test]
    fn test_encoded_query_separator_stays_in_path() {
        let root = output_root();
        fs::write(root.path().join("what?.html"), "qm").unwrap();
        let file = resolve_path("/what%3F.html", root.path()).unwrap();
        assert!(file.ends_with("what?.html"));
    }

    #[test]
    fn test_percent_decoding() {
        let root = output_root();
        fs::write(root.path().join("a b.html"), "spaced").unwrap();
        let file = resolve_path("/a%20b.html", root.path()).unwrap();
        assert!(file.ends_with("a b.html"));
    }

    #[test]
    fn test_traversal_rejected() {
        let root = output_root();
        assert!(resolve_path("/../secret.txt", root.path()).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", root.path()).is_none());
    }

    #[test]
    fn test_missing_path_is_none() {
        let root = output_root();
        assert!(resolve_path("/nope.html", root.path()).is_none());
    }
}
