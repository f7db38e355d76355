//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Plugin deployer - inspect plugin archives and plan their deployment
#[derive(Parser, Debug)]
#[command(name = "plugin-deployer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./plugin-deployer.toml when present)
    #[arg(short, long, global = true, env = "PLUGIN_DEPLOYER_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the descriptor, resolved version and dependencies of one archive
    Inspect {
        /// Plugin archive
        archive: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Scan a plugin directory and report survivors, obsolete archives and failures
    Scan {
        /// Plugin directory
        dir: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the deployment order of the plugins in a directory
    Order {
        /// Plugin directory
        dir: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
