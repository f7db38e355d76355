//! Validation diagnostics and where they are reported.
//!
//! Strict parsing never stops at the first structural problem. Every event
//! becomes a [`Diagnostic`] and the whole list is handed back to the caller,
//! which forwards it to a [`DiagnosticSink`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

/// How serious a validation event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    /// The document cannot be turned into a typed model at all.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("WARNING"),
            Self::Error => f.write_str("ERROR"),
            Self::Fatal => f.write_str("FATAL"),
        }
    }
}

/// One validation event with its position in the document (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            severity,
            line,
            column,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.severity, self.line, self.column, self.message
        )
    }
}

/// Receives the diagnostics produced while loading a document.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, archive: &Path, entry: &str, diagnostic: &Diagnostic);
}

/// Logs diagnostics through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, archive: &Path, entry: &str, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Fatal => tracing::error!(
                archive = %archive.display(),
                entry,
                "{}",
                diagnostic
            ),
            Severity::Warning | Severity::Error => tracing::warn!(
                archive = %archive.display(),
                entry,
                "{}",
                diagnostic
            ),
        }
    }
}

/// A reported diagnostic together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reported {
    pub archive: PathBuf,
    pub entry: String,
    pub diagnostic: Diagnostic,
}

/// Keeps every reported diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reported: Mutex<Vec<Reported>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything reported so far.
    pub fn take(&self) -> Vec<Reported> {
        let mut guard = self
            .reported
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, archive: &Path, entry: &str, diagnostic: &Diagnostic) {
        self.reported
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Reported {
                archive: archive.to_path_buf(),
                entry: entry.to_string(),
                diagnostic: diagnostic.clone(),
            });
    }
}
