//! Shared utilities.
//!
//! Pure helpers with no pipeline state:
//! - [`path`]: filesystem path normalization and project-relative paths
//! - [`mime`]: MIME type detection for the dev server
//! - [`plural`]: pluralization for log messages

pub mod mime;
pub mod path;
pub mod plural;
