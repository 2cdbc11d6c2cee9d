//! Step runtime boundary.
//!
//! The pipeline treats step logic as opaque callable units with a fixed
//! contract: a [`Loader`] writes records into the [`ContentStore`] before
//! any producer runs; a [`Step`] reads the store and/or one input file and
//! returns a [`StepOutput`]. How a step does its work (markup rendering,
//! templating, asset transforms) is none of the pipeline's business.

mod builtin;
mod registry;

pub use builtin::register_builtins;
pub use registry::StepRegistry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::store::ContentStore;

// =============================================================================
// Errors
// =============================================================================

/// Failure of a single step invocation.
///
/// Per-file step failures are collected into the build report; loader and
/// once-step failures abort the pass.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("{0}")]
    Message(String),
}

impl StepError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

// =============================================================================
// Step result
// =============================================================================

/// What a producer step hands back to the dispatcher.
///
/// `Files` is only legal under the `MultipleFiles` output policy: the step
/// names its own outputs (paths relative to the output root). The other
/// variants are a single content blob whose path comes from the route's
/// output policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    Bytes(Vec<u8>),
    Text(String),
    Files(Vec<(PathBuf, Vec<u8>)>),
}

impl StepOutput {
    /// Content bytes for single-output variants. `None` for `Files`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Text(text) => Some(text.as_bytes()),
            Self::Files(_) => None,
        }
    }
}

// =============================================================================
// Calling contract
// =============================================================================

/// Everything a producer step may look at during one invocation.
pub struct StepContext<'a> {
    /// Read-only view of the per-pass content store.
    pub store: &'a ContentStore,
    /// Absolute project root.
    pub root: &'a Path,
    /// Project-relative input path. `None` for `Once` steps, which run
    /// against the synthetic global input.
    pub input: Option<&'a Path>,
}

impl StepContext<'_> {
    /// Absolute path of the input file, if this invocation has one.
    pub fn input_abs(&self) -> Option<PathBuf> {
        self.input.map(|rel| self.root.join(rel))
    }

    /// Read the input file's bytes.
    pub fn read_input(&self) -> Result<Vec<u8>, StepError> {
        let Some(rel) = self.input else {
            return Err(StepError::msg("step has no input file"));
        };
        let abs = self.root.join(rel);
        std::fs::read(&abs).map_err(|e| StepError::Io(rel.to_path_buf(), e))
    }
}

/// A producer step: reads the store and/or an input file, yields content.
pub trait Step: Send + Sync {
    /// Stable identity, used for cache keys, route resolution, and reports.
    fn name(&self) -> &str;

    fn run(&self, ctx: &StepContext<'_>) -> Result<StepOutput, StepError>;
}

/// A loader step: populates the store before any producer runs.
pub trait Loader: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self, root: &Path, store: &mut ContentStore) -> Result<(), StepError>;
}

// =============================================================================
// Closure adapters
// =============================================================================

struct FnStep<F> {
    name: String,
    f: F,
}

impl<F> Step for FnStep<F>
where
    F: Fn(&StepContext<'_>) -> Result<StepOutput, StepError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &StepContext<'_>) -> Result<StepOutput, StepError> {
        (self.f)(ctx)
    }
}

/// Wrap a closure as a named producer step.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Step>
where
    F: Fn(&StepContext<'_>) -> Result<StepOutput, StepError> + Send + Sync + 'static,
{
    Arc::new(FnStep {
        name: name.into(),
        f,
    })
}

struct FnLoader<F> {
    name: String,
    f: F,
}

impl<F> Loader for FnLoader<F>
where
    F: Fn(&Path, &mut ContentStore) -> Result<(), StepError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, root: &Path, store: &mut ContentStore) -> Result<(), StepError> {
        (self.f)(root, store)
    }
}

/// Wrap a closure as a named loader step.
pub fn loader_from_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Loader>
where
    F: Fn(&Path, &mut ContentStore) -> Result<(), StepError> + Send + Sync + 'static,
{
    Arc::new(FnLoader {
        name: name.into(),
        f,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_output_as_bytes() {
        assert_eq!(
            StepOutput::Text("hi".into()).as_bytes(),
            Some("hi".as_bytes())
        );
        assert_eq!(StepOutput::Bytes(vec![1, 2]).as_bytes(), Some(&[1, 2][..]));
        assert!(StepOutput::Files(vec![]).as_bytes().is_none());
    }

    #[test]
    fn test_from_fn_step() {
        let step = from_fn("upper", |ctx| {
            let text = String::from_utf8(ctx.read_input()?)
                .map_err(|e| StepError::msg(e.to_string()))?;
            Ok(StepOutput::Text(text.to_uppercase()))
        });
        assert_eq!(step.name(), "upper");
    }

    #[test]
    fn test_read_input_without_file() {
        let store = ContentStore::new();
        let ctx = StepContext {
            store: &store,
            root: Path::new("/nowhere"),
            input: None,
        };
        assert!(ctx.read_input().is_err());
    }
}
