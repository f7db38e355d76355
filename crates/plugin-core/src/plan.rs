//! Deployment plans: which plugins to deploy, in what order.

use plugin_descriptor::Descriptor;
use serde::Serialize;

use crate::builder::ingest_dependencies;
use crate::graph::{DependencyGraph, PluginGraph};
use crate::scanner::ScanReport;
use crate::{Error, Result};

/// A complete, acyclic dependency graph and its deployment order.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentPlan {
    /// Plugin names, dependencies first.
    pub order: Vec<String>,
    pub graph: DependencyGraph,
}

impl DeploymentPlan {
    /// Plan the deployment of every surviving plugin in `report`.
    pub fn build(report: &ScanReport) -> Result<Self> {
        Self::from_descriptors(report.plugins.iter().map(|p| &p.descriptor))
    }

    /// Plan the deployment of `descriptors`.
    ///
    /// # Errors
    ///
    /// - [`Error::IncompleteGraph`] if a required dependency is not among them
    /// - [`Error::Cycle`] with the graph's cycle error, unchanged
    pub fn from_descriptors<'a>(descriptors: impl IntoIterator<Item = &'a Descriptor>) -> Result<Self> {
        let mut graph = DependencyGraph::new();
        for descriptor in descriptors {
            ingest_dependencies(&mut graph, descriptor);
        }

        let missing = graph.missing_required();
        if !missing.is_empty() {
            return Err(Error::IncompleteGraph { missing });
        }

        let order = graph.topological_order()?;
        tracing::info!("Deployment order: {}", order.join(", "));
        Ok(Self { order, graph })
    }

    /// Position of `name` in the deployment order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }
}
