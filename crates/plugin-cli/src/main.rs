//! Plugin deployer CLI
//!
//! Inspects plugin archives, scans plugin directories and prints the
//! deployment order.

mod cli;
mod commands;
mod error;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use plugin_core::{CONFIG_FILE_NAME, DeployerConfig};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { archive, json } => commands::run_inspect(config, &archive, json),
        Commands::Scan { dir, json } => commands::run_scan(config, &dir, json),
        Commands::Order { dir, json } => commands::run_order(config, &dir, json),
    }
}

/// Log to stderr; `RUST_LOG` selects the filter unless `--verbose` forces debug.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn load_config(explicit: Option<&Path>) -> Result<DeployerConfig> {
    let default_path = Path::new(CONFIG_FILE_NAME);
    let path = explicit.or_else(|| default_path.is_file().then_some(default_path));
    Ok(DeployerConfig::load_or_default(path)?)
}
