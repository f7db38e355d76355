//! Command implementations for plugin-cli

pub mod inspect;
pub mod order;
pub mod scan;

pub use inspect::run_inspect;
pub use order::run_order;
pub use scan::run_scan;

use colored::Colorize;
use plugin_core::ScanFailure;
use serde::Serialize;

use crate::error::Result;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_failures(failures: &[ScanFailure]) {
    for failure in failures {
        eprintln!(
            "{} {}: {}",
            "failed:".red().bold(),
            failure.path.display(),
            failure.error
        );
    }
}
