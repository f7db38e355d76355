//! Scanning a plugin directory.
//!
//! Every archive is loaded independently; one broken archive is recorded as
//! a failure and never aborts the batch. Archives sharing a plugin name are
//! reduced to one survivor with [`decide`]. Nothing on disk is changed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use plugin_descriptor::{CannedExpressions, Descriptor, DescriptorLoader};
use serde::Serialize;

use crate::config::DeployerConfig;
use crate::obsolescence::{Basis, Decision, Side, decide};
use crate::plugin::Plugin;
use crate::{Error, Result};

/// A plugin archive loaded in full.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedPlugin {
    pub plugin: Plugin,
    pub descriptor: Descriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canned_expressions: Option<CannedExpressions>,
}

/// An archive superseded by another archive of the same plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObsoleteArchive {
    pub name: String,
    pub path: PathBuf,
    pub superseded_by: PathBuf,
    /// `None` when both archives have identical content.
    pub basis: Option<Basis>,
}

/// An archive that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of scanning one directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// One plugin per name, sorted by name.
    pub plugins: Vec<LoadedPlugin>,
    pub obsolete: Vec<ObsoleteArchive>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn plugin(&self, name: &str) -> Option<&LoadedPlugin> {
        self.plugins.iter().find(|p| p.plugin.name == name)
    }
}

/// Loads and deduplicates every plugin archive in a directory.
#[derive(Debug, Clone)]
pub struct PluginScanner {
    loader: DescriptorLoader,
    config: DeployerConfig,
}

impl PluginScanner {
    pub fn new(config: DeployerConfig) -> Self {
        Self {
            loader: config.loader(),
            config,
        }
    }

    /// Replace the descriptor loader built from the configuration.
    pub fn with_loader(mut self, loader: DescriptorLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Load one archive: descriptor, resolved record and canned expressions.
    pub fn load(&self, archive: &Path) -> Result<LoadedPlugin> {
        let descriptor = self.loader.load_descriptor(archive)?;
        let plugin = Plugin::from_archive(&descriptor, archive)?;
        let canned_expressions = self.loader.load_canned_expressions(archive)?;
        Ok(LoadedPlugin {
            plugin,
            descriptor,
            canned_expressions,
        })
    }

    /// Archive files in `dir` with a configured extension, sorted by path.
    pub fn archives(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        let mut archives: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.config.is_archive(path))
            .collect();
        archives.sort();
        Ok(archives)
    }

    /// Scan `dir`.
    ///
    /// # Errors
    ///
    /// Only when the directory itself cannot be listed; per-archive
    /// problems end up in [`ScanReport::failures`].
    pub fn scan(&self, dir: &Path) -> Result<ScanReport> {
        let mut survivors: BTreeMap<String, LoadedPlugin> = BTreeMap::new();
        let mut report = ScanReport::default();

        for archive in self.archives(dir)? {
            let loaded = match self.load(&archive) {
                Ok(loaded) => loaded,
                Err(e) => {
                    tracing::warn!("Skipping plugin archive {}: {}", archive.display(), e);
                    report.failures.push(ScanFailure {
                        path: archive,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let name = loaded.plugin.name.clone();
            let Some(current) = survivors.remove(&name) else {
                tracing::debug!("Found plugin '{}' in {}", name, archive.display());
                survivors.insert(name, loaded);
                continue;
            };

            let decision = decide(&current.plugin, &loaded.plugin)?;
            let (keep, stale, basis) = match decision {
                Decision::Identical => (current, loaded, None),
                Decision::Obsolete {
                    side: Side::First,
                    basis,
                } => (loaded, current, Some(basis)),
                Decision::Obsolete {
                    side: Side::Second,
                    basis,
                } => (current, loaded, Some(basis)),
            };

            tracing::info!(
                "Plugin '{}': keeping {}, {} is obsolete ({})",
                name,
                keep.plugin.path.display(),
                stale.plugin.path.display(),
                basis.map_or_else(|| "identical content".to_string(), |b| b.to_string())
            );
            report.obsolete.push(ObsoleteArchive {
                name: name.clone(),
                path: stale.plugin.path,
                superseded_by: keep.plugin.path.clone(),
                basis,
            });
            survivors.insert(name, keep);
        }

        report.plugins = survivors.into_values().collect();
        Ok(report)
    }
}

impl Default for PluginScanner {
    fn default() -> Self {
        Self::new(DeployerConfig::default())
    }
}
