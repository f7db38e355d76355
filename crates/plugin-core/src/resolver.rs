//! Effective plugin version resolution.

use std::path::Path;

use plugin_archive::IMPLEMENTATION_VERSION;
use plugin_descriptor::Descriptor;

use crate::version::PluginVersion;
use crate::{Error, Result};

/// Descriptor attribute consulted first.
pub const VERSION_ATTRIBUTE: &str = "version";

/// Resolve the version of the plugin in `archive`.
///
/// The descriptor's `version` attribute wins; the manifest's
/// `Implementation-Version` entry is the fallback.
///
/// # Errors
///
/// - [`Error::NoVersion`] if neither source has a version
/// - [`Error::MalformedVersion`] if the chosen string does not parse
/// - [`Error::Archive`] if the manifest cannot be read
pub fn resolve_version(descriptor: &Descriptor, archive: &Path) -> Result<PluginVersion> {
    let raw = match descriptor.version.as_deref() {
        Some(version) => version.to_string(),
        None => {
            let manifest = plugin_archive::read_manifest(archive)?;
            match manifest.as_ref().and_then(|m| m.implementation_version()) {
                Some(version) => {
                    tracing::debug!(
                        "Plugin '{}' has no descriptor version, using manifest version {}",
                        descriptor.name,
                        version
                    );
                    version.to_string()
                }
                None => {
                    return Err(Error::NoVersion {
                        archive: archive.to_path_buf(),
                        attribute: VERSION_ATTRIBUTE,
                        manifest_key: IMPLEMENTATION_VERSION,
                    });
                }
            }
        }
    };

    PluginVersion::parse(&raw).map_err(|source| Error::MalformedVersion {
        version: raw,
        archive: archive.to_path_buf(),
        source,
    })
}
