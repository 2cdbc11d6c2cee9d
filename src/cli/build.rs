//! The `build` command: one full pass, then exit.

use anyhow::Result;

use crate::dispatch::Dispatcher;
use crate::utils::plural::plural_count;

/// Run a full build pass and report.
///
/// Per-file errors are logged by the report and turn into a nonzero exit;
/// loader and once-step failures abort with their own error.
pub fn run_build(dispatcher: &Dispatcher) -> Result<()> {
    let report = dispatcher.run_full()?;
    report.log_summary();

    if report.has_errors() {
        anyhow::bail!(
            "build finished with {}",
            plural_count(report.errors.len(), "error")
        );
    }
    Ok(())
}
