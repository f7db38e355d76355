//! Plugin deployment core
//!
//! Turns loaded plugin descriptors into deployable plugin records and a
//! deployment order:
//!
//! - [`version`] - Maven-style comparable versions
//! - [`resolver`] - effective version of a plugin archive
//! - [`obsolescence`] - which of two same-named plugins is stale
//! - [`builder`] and [`graph`] - dependency edges and ordering
//! - [`scanner`] and [`plan`] - whole-directory scans and deployment plans

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod obsolescence;
pub mod plan;
pub mod plugin;
pub mod resolver;
pub mod scanner;
pub mod version;

pub use builder::{DependencySet, collect_dependencies, ingest_dependencies};
pub use config::{CONFIG_FILE_NAME, DeployerConfig};
pub use error::{Error, Result};
pub use graph::{CycleError, DependencyGraph, PluginGraph};
pub use obsolescence::{Basis, Decision, Side, decide};
pub use plan::DeploymentPlan;
pub use plugin::Plugin;
pub use resolver::resolve_version;
pub use scanner::{LoadedPlugin, ObsoleteArchive, PluginScanner, ScanFailure, ScanReport};
pub use version::{PluginVersion, VersionParseError};
