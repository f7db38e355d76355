//! Deployer configuration from `plugin-deployer.toml`.
//!
//! Every field has a default, so a missing file or an empty one yields a
//! working configuration:
//!
//! ```toml
//! [descriptor]
//! path = "META-INF/plugin-descriptor.xml"
//! canned_expressions_path = "META-INF/canned-group-expressions.xml"
//! schema = "plugin-descriptor"
//! validate = true
//!
//! [environment]
//! defective_signatures = ["IBM J9"]
//! runtime = "IBM J9 VM 2.4"
//!
//! [scan]
//! extensions = ["jar", "zip"]
//! ```

use std::path::Path;
use std::sync::Arc;

use plugin_descriptor::{
    CANNED_EXPRESSIONS_PATH, DESCRIPTOR_PATH, DescriptorLoader, FallbackPolicy, FixedProbe,
    PLUGIN_DESCRIPTOR_SCHEMA,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "plugin-deployer.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployerConfig {
    pub descriptor: DescriptorSettings,
    pub environment: EnvironmentSettings,
    pub scan: ScanSettings,
}

/// Where descriptors live in an archive and how they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DescriptorSettings {
    pub path: String,
    pub canned_expressions_path: String,
    /// Resource name of the descriptor schema.
    pub schema: String,
    pub validate: bool,
}

impl Default for DescriptorSettings {
    fn default() -> Self {
        Self {
            path: DESCRIPTOR_PATH.to_string(),
            canned_expressions_path: CANNED_EXPRESSIONS_PATH.to_string(),
            schema: PLUGIN_DESCRIPTOR_SCHEMA.to_string(),
            validate: true,
        }
    }
}

/// Runtime identification for the validation fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    /// Runtimes whose strict validation is known to be broken.
    pub defective_signatures: Vec<String>,
    /// Overrides the probed runtime signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Archive file extensions, without the dot.
    pub extensions: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["jar".to_string(), "zip".to_string()],
        }
    }
}

impl DeployerConfig {
    /// Parse a configuration document.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml(&content, path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy::new(self.environment.defective_signatures.iter().cloned())
    }

    /// A descriptor loader configured from these settings.
    pub fn loader(&self) -> DescriptorLoader {
        let loader = DescriptorLoader::new()
            .with_descriptor_path(&self.descriptor.path)
            .with_canned_expressions_path(&self.descriptor.canned_expressions_path)
            .with_schema(&self.descriptor.schema)
            .with_validation(self.descriptor.validate)
            .with_fallback(self.fallback_policy());
        match &self.environment.runtime {
            Some(runtime) => loader.with_probe(Arc::new(FixedProbe::new(runtime))),
            None => loader,
        }
    }

    /// Whether `path` has one of the configured archive extensions.
    pub fn is_archive(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.scan
                    .extensions
                    .iter()
                    .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}
