//! Error types for plugin-archive

use std::path::PathBuf;

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a plugin archive
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The archive could not be opened as a zip file at all.
    #[error(
        "archive {archive} is unreadable - perhaps the file has not been fully written yet: {source}"
    )]
    UnreadableArchive {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive is readable but has no entry at the requested path.
    #[error("entry {entry} not found in archive {archive}")]
    EntryNotFound { archive: PathBuf, entry: String },

    /// The entry exists but its content could not be read.
    #[error("failed to read entry {entry} from archive {archive}: {source}")]
    EntryRead {
        archive: PathBuf,
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn unreadable(archive: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::UnreadableArchive {
            archive: archive.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the requested entry is simply absent.
    pub fn is_entry_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound { .. })
    }
}
