//! Error types for plugin-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] plugin_core::Error),

    #[error("failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
