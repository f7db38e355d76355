//! Error types for plugin-core

use std::path::PathBuf;

use crate::graph::CycleError;
use crate::version::VersionParseError;

/// Errors that can occur while resolving, comparing and ordering plugins.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Archive(#[from] plugin_archive::Error),

    #[error(transparent)]
    Descriptor(#[from] plugin_descriptor::Error),

    /// Neither the descriptor nor the archive manifest carries a version.
    #[error(
        "no version for plugin archive {archive}: set the descriptor '{attribute}' attribute or the manifest '{manifest_key}' entry"
    )]
    NoVersion {
        archive: PathBuf,
        attribute: &'static str,
        manifest_key: &'static str,
    },

    #[error("malformed version '{version}' in plugin archive {archive}: {source}")]
    MalformedVersion {
        version: String,
        archive: PathBuf,
        #[source]
        source: VersionParseError,
    },

    /// A caller broke a precondition; this is a bug, not a runtime condition.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("required dependencies are not deployed: {}", format_missing(.missing))]
    IncompleteGraph { missing: Vec<(String, String)> },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn format_missing(missing: &[(String, String)]) -> String {
    missing
        .iter()
        .map(|(plugin, dependency)| format!("{plugin} -> {dependency}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for plugin-core operations
pub type Result<T> = std::result::Result<T, Error>;
