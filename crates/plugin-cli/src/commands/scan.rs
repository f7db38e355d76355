//! The scan command

use std::path::Path;

use colored::Colorize;
use plugin_core::{DeployerConfig, PluginScanner};

use super::{print_failures, print_json};
use crate::error::Result;

/// Run the scan command
pub fn run_scan(config: DeployerConfig, dir: &Path, json: bool) -> Result<()> {
    let report = PluginScanner::new(config).scan(dir)?;

    if json {
        return print_json(&report);
    }

    println!("{}", "Plugins".bold());
    for loaded in &report.plugins {
        let plugin = &loaded.plugin;
        let version = plugin
            .version
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        println!(
            "  {:<24} {:<12} {}",
            plugin.name.green(),
            version,
            plugin.path.display().to_string().dimmed()
        );
    }

    if !report.obsolete.is_empty() {
        println!();
        println!("{}", "Obsolete".bold());
        for obsolete in &report.obsolete {
            let reason = obsolete
                .basis
                .map_or_else(|| "identical content".to_string(), |b| b.to_string());
            println!(
                "  {:<24} {} ({}, superseded by {})",
                obsolete.name.yellow(),
                obsolete.path.display(),
                reason,
                obsolete.superseded_by.display()
            );
        }
    }

    print_failures(&report.failures);

    println!();
    println!(
        "{} {} plugins, {} obsolete, {} failed",
        "Total:".dimmed(),
        report.plugins.len(),
        report.obsolete.len(),
        report.failures.len()
    );
    Ok(())
}
