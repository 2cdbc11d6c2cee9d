//! Output naming: map an input path (and step result shape) to output paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Custom naming function: input relative path -> output relative path.
pub type OutputFn = Arc<dyn Fn(&Path) -> PathBuf + Send + Sync>;

/// How a route computes the output path for a step result.
///
/// All paths are relative to the output root; the dispatcher creates
/// parent directories as needed.
#[derive(Clone)]
pub enum OutputPolicy {
    /// Output path equals input path.
    SameFileName,
    /// Input path with the extension replaced (stored without leading dot).
    ChangeExtension(String),
    /// A single fixed output path, independent of input (pairs with `Once`).
    NewFileName(PathBuf),
    /// Arbitrary path function.
    Custom(OutputFn),
    /// The step names its own outputs: its result must be
    /// `StepOutput::Files`, each entry written verbatim.
    MultipleFiles,
}

impl OutputPolicy {
    /// Extension-change policy; accepts `"html"` or `".html"`.
    pub fn change_ext(extension: impl AsRef<str>) -> Self {
        let ext = extension.as_ref();
        Self::ChangeExtension(ext.strip_prefix('.').unwrap_or(ext).to_string())
    }

    /// Custom policy from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Path) -> PathBuf + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Resolve the single output path for the given input.
    ///
    /// Returns `None` for `MultipleFiles` (paths come from the step
    /// result) and for input-derived policies applied to the inputless
    /// global pseudo-file.
    pub fn resolve(&self, input: Option<&Path>) -> Option<PathBuf> {
        match self {
            Self::SameFileName => input.map(Path::to_path_buf),
            Self::ChangeExtension(ext) => input.map(|path| path.with_extension(ext)),
            Self::NewFileName(name) => Some(name.clone()),
            Self::Custom(f) => input.map(|path| f(path)),
            Self::MultipleFiles => None,
        }
    }
}

impl fmt::Debug for OutputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameFileName => write!(f, "SameFileName"),
            Self::ChangeExtension(ext) => write!(f, "ChangeExtension(.{ext})"),
            Self::NewFileName(name) => write!(f, "NewFileName({})", name.display()),
            Self::Custom(_) => write!(f, "Custom(..)"),
            Self::MultipleFiles => write!(f, "MultipleFiles"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_file_name() {
        let policy = OutputPolicy::SameFileName;
        assert_eq!(
            policy.resolve(Some(Path::new("a/b.css"))),
            Some(PathBuf::from("a/b.css"))
        );
    }

    #[test]
    fn test_change_extension() {
        let policy = OutputPolicy::change_ext("html");
        assert_eq!(
            policy.resolve(Some(Path::new("a/b.md"))),
            Some(PathBuf::from("a/b.html"))
        );
    }

    #[test]
    fn test_change_extension_leading_dot() {
        let policy = OutputPolicy::change_ext(".html");
        assert_eq!(
            policy.resolve(Some(Path::new("b.md"))),
            Some(PathBuf::from("b.html"))
        );
    }

    #[test]
    fn test_new_file_name_ignores_input() {
        let policy = OutputPolicy::NewFileName(PathBuf::from("x.html"));
        assert_eq!(
            policy.resolve(Some(Path::new("deep/nested/input.md"))),
            Some(PathBuf::from("x.html"))
        );
        assert_eq!(policy.resolve(None), Some(PathBuf::from("x.html")));
    }

    #[test]
    fn test_custom() {
        let policy = OutputPolicy::custom(|input| Path::new("generated").join(input));
        assert_eq!(
            policy.resolve(Some(Path::new("a.md"))),
            Some(PathBuf::from("generated/a.md"))
        );
    }

    #[test]
    fn test_multiple_files_resolves_nothing() {
        let policy = OutputPolicy::MultipleFiles;
        assert_eq!(policy.resolve(Some(Path::new("a.md"))), None);
    }

    #[test]
    fn test_input_derived_policy_without_input() {
        assert_eq!(OutputPolicy::SameFileName.resolve(None), None);
        assert_eq!(OutputPolicy::change_ext("html").resolve(None), None);
    }
}
