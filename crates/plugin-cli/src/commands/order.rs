//! The order command

use std::path::Path;

use colored::Colorize;
use plugin_core::{DeployerConfig, DeploymentPlan, PluginScanner};

use super::{print_failures, print_json};
use crate::error::Result;

/// Run the order command
pub fn run_order(config: DeployerConfig, dir: &Path, json: bool) -> Result<()> {
    let report = PluginScanner::new(config).scan(dir)?;
    print_failures(&report.failures);
    let plan = DeploymentPlan::build(&report)?;

    if json {
        return print_json(&plan);
    }

    println!("{}", "Deployment order".bold());
    for (i, name) in plan.order.iter().enumerate() {
        let deps: Vec<&str> = plan
            .graph
            .required_dependencies_of(name)
            .map(|d| d.plugin.as_str())
            .collect();
        if deps.is_empty() {
            println!("  {:>3}. {}", i + 1, name.green());
        } else {
            println!(
                "  {:>3}. {} {}",
                i + 1,
                name.green(),
                format!("(after {})", deps.join(", ")).dimmed()
            );
        }
    }
    Ok(())
}
