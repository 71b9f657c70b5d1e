//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Migration config could not be loaded.
    #[error(transparent)]
    Migration(#[from] iam_core::Error),

    /// Management API error.
    #[error("API error: {0}")]
    Api(#[from] iam_client::ApiError),

    /// Resource file could not be parsed or written.
    #[error("resource file error: {0}")]
    Keywords(#[from] iam_keywords::KeywordError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
