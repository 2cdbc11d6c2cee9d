//! Trigger evaluation: which input files activate a producer step.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Predicate function over (project root, project-relative path).
///
/// Must be pure with respect to the store; reading the file itself to
/// decide (front-matter markers and the like) is allowed.
pub type TriggerPredicate = Arc<dyn Fn(&Path, &Path) -> bool + Send + Sync>;

/// Which input files activate a route.
#[derive(Clone)]
pub enum Trigger {
    /// Runs exactly once per build against the synthetic global input.
    Once,
    /// Exact project-relative path match.
    File(std::path::PathBuf),
    /// Case-sensitive extension match (stored without the leading dot).
    Extension(String),
    /// Arbitrary predicate over (root, relative path).
    Predicate(TriggerPredicate),
}

impl Trigger {
    /// Extension trigger; accepts `"md"` or `".md"`.
    pub fn ext(extension: impl AsRef<str>) -> Self {
        let ext = extension.as_ref();
        Self::Extension(ext.strip_prefix('.').unwrap_or(ext).to_string())
    }

    /// Predicate trigger from a closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Path, &Path) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Does this trigger activate for the given project file?
    ///
    /// `Once` never matches a concrete file; the dispatcher runs once
    /// routes against the global pseudo-input instead.
    pub fn matches(&self, root: &Path, rel: &Path) -> bool {
        match self {
            Self::Once => false,
            Self::File(path) => rel == path,
            Self::Extension(ext) => {
                rel.extension().and_then(|e| e.to_str()) == Some(ext.as_str())
            }
            Self::Predicate(predicate) => predicate(root, rel),
        }
    }

    pub fn is_once(&self) -> bool {
        matches!(self, Self::Once)
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once => write!(f, "Once"),
            Self::File(path) => write!(f, "File({})", path.display()),
            Self::Extension(ext) => write!(f, "Extension(.{ext})"),
            Self::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}
