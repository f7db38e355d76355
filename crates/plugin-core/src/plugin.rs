//! Resolved plugin records.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use plugin_descriptor::Descriptor;
use serde::Serialize;

use crate::Result;
use crate::resolver::resolve_version;
use crate::version::PluginVersion;

/// A plugin as found on disk: descriptor identity plus archive facts.
///
/// Two records describe the same logical plugin iff their names match;
/// every other attribute may differ.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    pub name: String,
    pub display_name: String,
    /// `None` compares as version `0`.
    pub version: Option<PluginVersion>,
    /// Content digest of the archive, `sha256:<hex>`.
    pub digest: String,
    pub modified: DateTime<Utc>,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Plugin {
    /// Build the record for `archive` from its already loaded descriptor.
    ///
    /// Resolves the version and fingerprints the archive file.
    pub fn from_archive(descriptor: &Descriptor, archive: &Path) -> Result<Self> {
        let version = resolve_version(descriptor, archive)?;
        let fingerprint = plugin_archive::fingerprint(archive)?;
        Ok(Self {
            name: descriptor.name.clone(),
            display_name: descriptor.display_name().to_string(),
            version: Some(version),
            digest: fingerprint.digest,
            modified: fingerprint.modified,
            path: archive.to_path_buf(),
            help: descriptor.help.clone(),
            description: descriptor.description.clone(),
        })
    }

    /// Re-read digest and timestamp after the archive changed on disk.
    pub fn refresh(&mut self) -> Result<()> {
        let fingerprint = plugin_archive::fingerprint(&self.path)?;
        self.digest = fingerprint.digest;
        self.modified = fingerprint.modified;
        Ok(())
    }

    /// The version used for comparisons.
    pub fn effective_version(&self) -> PluginVersion {
        self.version.clone().unwrap_or_else(PluginVersion::zero)
    }
}
