//! Configuration error types.
//!
//! All of these are fatal at process start: the pipeline never runs with a
//! config it could not fully load, validate, and resolve.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    #[error("route {index}: unknown step `{step}` (available: {available})")]
    UnknownStep {
        index: usize,
        step: String,
        available: String,
    },

    #[error("loader {index}: unknown loader `{step}`")]
    UnknownLoader { index: usize, step: String },
}

/// Collects validation problems so the user sees them all at once.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<String>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(format!("[{field}] {}", message.into()));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Convert to Result (returns Err if there are errors).
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(self.errors.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_collect_all() {
        let mut diag = ConfigDiagnostics::new();
        diag.error("route.0", "needs a trigger");
        diag.error("route.2", "needs an output");

        let err = diag.into_result().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("route.0"));
        assert!(text.contains("route.2"));
    }

    #[test]
    fn test_empty_diagnostics_ok() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());
    }
}
