//! Error types for plugin-descriptor

use std::path::PathBuf;

use crate::diagnostic::Diagnostic;

/// Result type for descriptor loading
pub type Result<T> = std::result::Result<T, Error>;

/// A failure to turn document bytes into a typed descriptor.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),

    /// Strict validation raised fatal diagnostics, so no document was built.
    #[error("strict validation failed with {} fatal diagnostic(s): {}", .fatal.len(), summarize(.fatal))]
    Invalid { fatal: Vec<Diagnostic> },

    #[error("unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { found: String, expected: String },

    #[error("<{element}> at {line}:{column} is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: String,
        line: u32,
        column: u32,
    },

    #[error("<{element}> at {line}:{column} has invalid {attribute}=\"{value}\": {reason}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        reason: String,
        line: u32,
        column: u32,
    },
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while loading descriptors from archives
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Archive(plugin_archive::Error),

    /// The primary descriptor entry is absent from a readable archive.
    #[error("could not load {entry} from plugin archive {archive}")]
    DescriptorNotFound { archive: PathBuf, entry: String },

    #[error("failed to parse {entry} in plugin archive {archive}: {source}")]
    Parse {
        archive: PathBuf,
        entry: String,
        #[source]
        source: ParseError,
    },

    #[error("schema resource '{name}' not found")]
    SchemaNotFound { name: String },

    #[error("schema resource '{name}' is invalid: {message}")]
    SchemaInvalid { name: String, message: String },
}

impl From<plugin_archive::Error> for Error {
    fn from(e: plugin_archive::Error) -> Self {
        match e {
            plugin_archive::Error::EntryNotFound { archive, entry } => {
                Self::DescriptorNotFound { archive, entry }
            }
            other => Self::Archive(other),
        }
    }
}

impl Error {
    /// Whether the archive itself could not be opened.
    pub fn is_unreadable_archive(&self) -> bool {
        matches!(
            self,
            Self::Archive(plugin_archive::Error::UnreadableArchive { .. })
        )
    }
}
