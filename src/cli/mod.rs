//! Command-line interface module.

mod args;
pub mod build;
pub mod clean;
pub mod serve;
pub mod watch;

pub use args::{Cli, Commands};
