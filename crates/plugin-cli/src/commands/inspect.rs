//! The inspect command

use std::path::Path;

use colored::Colorize;
use plugin_core::{DeployerConfig, LoadedPlugin, PluginScanner, collect_dependencies};
use plugin_descriptor::Dependency;
use serde::Serialize;

use super::print_json;
use crate::error::Result;

#[derive(Serialize)]
struct InspectReport<'a> {
    #[serde(flatten)]
    loaded: &'a LoadedPlugin,
    dependencies: Vec<Dependency>,
}

/// Run the inspect command
pub fn run_inspect(config: DeployerConfig, archive: &Path, json: bool) -> Result<()> {
    let loaded = PluginScanner::new(config).load(archive)?;
    let dependencies = collect_dependencies(&loaded.descriptor).into_vec();

    if json {
        return print_json(&InspectReport {
            loaded: &loaded,
            dependencies,
        });
    }

    let plugin = &loaded.plugin;
    println!("{} {}", plugin.name.green().bold(), plugin.display_name.dimmed());
    let version = plugin
        .version
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    println!("  {:<12} {}", "version:".dimmed(), version);
    println!("  {:<12} {}", "digest:".dimmed(), plugin.digest);
    println!("  {:<12} {}", "modified:".dimmed(), plugin.modified.to_rfc3339());
    if let Some(description) = &plugin.description {
        println!("  {:<12} {}", "description:".dimmed(), description);
    }
    println!(
        "  {:<12} {}",
        "resources:".dimmed(),
        loaded.descriptor.walk().len()
    );

    println!();
    if dependencies.is_empty() {
        println!("{}", "No dependencies".dimmed());
    } else {
        println!("{}", "Dependencies:".cyan().bold());
        for dep in &dependencies {
            let kind = if dep.required {
                "required".yellow()
            } else {
                "optional".dimmed()
            };
            let classes = if dep.use_classes { " (use classes)" } else { "" };
            println!("  {:<20} {}{}", dep.plugin, kind, classes);
        }
    }

    if let Some(canned) = &loaded.canned_expressions {
        println!();
        println!("{}", "Canned group expressions:".cyan().bold());
        for expr in &canned.expressions {
            println!("  {:<30} {}", expr.reference_key(&plugin.name), expr.name);
        }
    }

    Ok(())
}
