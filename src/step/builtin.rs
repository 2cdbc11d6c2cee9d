//! Built-in steps.
//!
//! Only `copy` ships with the engine: a byte passthrough that makes a bare
//! config useful (static assets). Content-domain steps (markup renderers,
//! template engines) are external producers registered by the embedder.

use super::{Step, StepContext, StepError, StepOutput, StepRegistry};
use std::sync::Arc;

/// Byte passthrough: output equals input content.
///
/// Pair with a `SameFileName` output policy and a catch-all or extension
/// trigger to copy assets into the output tree.
pub struct CopyStep;

impl Step for CopyStep {
    fn name(&self) -> &str {
        "copy"
    }

    fn run(&self, ctx: &StepContext<'_>) -> Result<StepOutput, StepError> {
        Ok(StepOutput::Bytes(ctx.read_input()?))
    }
}

/// Register all built-in steps.
pub fn register_builtins(registry: &mut StepRegistry) {
    registry.register(Arc::new(CopyStep));
}
