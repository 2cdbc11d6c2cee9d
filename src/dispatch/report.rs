//! Per-pass build report.
//!
//! Recoverable problems accumulate here and surface once, at the end of
//! the pass; fatal problems never reach the report (the pass aborts with a
//! `DispatchError` instead).

use std::path::PathBuf;
use std::time::Duration;

use crate::utils::plural::plural_count;
use crate::{log, logger};

/// A recovered per-file failure: the file's output was skipped, the rest
/// of the pass continued.
#[derive(Debug)]
pub struct FileError {
    /// Project-relative input path (or the step name for once steps).
    pub path: PathBuf,
    /// Offending step identity.
    pub step: String,
    pub message: String,
}

impl FileError {
    pub fn summary(&self) -> String {
        format!("{} ({})", self.path.display(), self.step)
    }
}

/// Outcome of one dispatcher pass.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Step invocations that actually ran.
    pub invoked: usize,
    /// Invocations answered from the step cache.
    pub cached: usize,
    /// Output files written.
    pub written: usize,
    /// Recovered per-file errors.
    pub errors: Vec<FileError>,
    /// Output collision and policy warnings.
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fold a per-file outcome into the pass report.
    pub fn absorb(&mut self, other: BuildReport) {
        self.invoked += other.invoked;
        self.cached += other.cached;
        self.written += other.written;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Log the end-of-pass summary for `build`.
    pub fn log_summary(&self) {
        for warning in &self.warnings {
            log!("warning"; "{warning}");
        }
        for error in &self.errors {
            log!("error"; "{}: {}", error.summary(), error.message);
        }

        let mut line = format!(
            "{} in {:.2}s",
            plural_count(self.written, "file"),
            self.elapsed.as_secs_f32()
        );
        if self.cached > 0 {
            line.push_str(&format!(" ({} cached)", self.cached));
        }
        if self.has_errors() {
            line.push_str(&format!(", {}", plural_count(self.errors.len(), "error")));
        }
        log!("build"; "{line}");
    }

    /// Single-line status for watch mode rebuilds.
    pub fn log_watch_status(&self, changed: usize) {
        for warning in &self.warnings {
            logger::status_warning(warning);
        }

        if let Some(error) = self.errors.first() {
            logger::status_error(
                &format!(
                    "rebuilt {} with {}",
                    plural_count(changed, "change"),
                    plural_count(self.errors.len(), "error")
                ),
                &format!("{}: {}", error.summary(), error.message),
            );
        } else {
            logger::status_success(&format!(
                "rebuilt {} ({} written, {} cached)",
                plural_count(changed, "change"),
                self.written,
                self.cached
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_accumulates() {
        let mut report = BuildReport::default();
        report.absorb(BuildReport {
            invoked: 2,
            written: 2,
            ..Default::default()
        });
        report.absorb(BuildReport {
            invoked: 1,
            cached: 3,
            errors: vec![FileError {
                path: PathBuf::from("a.md"),
                step: "render".into(),
                message: "boom".into(),
            }],
            ..Default::default()
        });

        assert_eq!(report.invoked, 3);
        assert_eq!(report.cached, 3);
        assert_eq!(report.written, 2);
        assert!(report.has_errors());
    }
}
