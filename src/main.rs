//! sitemill - an incremental content-generation build engine.

#![allow(dead_code)]

mod cache;
mod cli;
mod config;
mod core;
mod dispatch;
mod freshness;
mod logger;
mod reload;
mod route;
mod step;
mod store;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use cache::StepCache;
use cli::{Cli, Commands};
use config::{Config, resolve_routes};
use dispatch::Dispatcher;
use step::StepRegistry;

fn main() -> Result<()> {
    // Ctrl+C handler first, before any blocking operation.
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(Config::load(&cli.root, &cli.config)?);

    match cli.command {
        Commands::Build => {
            let dispatcher = make_dispatcher(&config)?;
            cli::build::run_build(&dispatcher)
        }
        Commands::Watch { interface, port } => {
            let dispatcher = make_dispatcher(&config)?;
            let config_path = if cli.config.is_absolute() {
                cli.config.clone()
            } else {
                config.root.join(&cli.config)
            };
            cli::watch::run_watch(Arc::clone(&config), dispatcher, &config_path, interface, port)
        }
        Commands::Clean => cli::clean::run_clean(&config),
    }
}

/// Resolve declarative routes against the step registry and assemble the
/// dispatcher.
fn make_dispatcher(config: &Arc<Config>) -> Result<Dispatcher> {
    let registry = StepRegistry::with_builtins();
    let routes = resolve_routes(config, &registry)?;
    Ok(Dispatcher::new(
        Arc::clone(config),
        Arc::new(routes),
        Arc::new(StepCache::new()),
    ))
}
