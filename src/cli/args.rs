//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// sitemill content build engine
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sitemill.toml)
    #[arg(short = 'C', long, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Project root directory
    #[arg(short, long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub root: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one full build pass
    #[command(visible_alias = "b")]
    Build,

    /// Serve the output, rebuild on change, live-reload the browser
    #[command(visible_alias = "w")]
    Watch {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Remove the output directory and the cache sidecar
    Clean,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_watch_accepts_port_override() {
        let cli = Cli::parse_from(["sitemill", "watch", "--port", "4000"]);
        match cli.command {
            Commands::Watch { port, .. } => assert_eq!(port, Some(4000)),
            _ => panic!("expected watch command"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["sitemill", "build"]);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(!cli.verbose);
    }
}
