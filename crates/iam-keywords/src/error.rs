//! Keyword engine error types.

use thiserror::Error;

/// Errors raised while parsing or serializing documents.
#[derive(Debug, Error)]
pub enum KeywordError {
    /// Input is not valid YAML or JSON.
    #[error("failed to parse document: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// Document could not be written as YAML.
    #[error("failed to serialize document as YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),

    /// Document could not be written as JSON.
    #[error("failed to serialize document as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for keyword operations.
pub type KeywordResult<T> = Result<T, KeywordError>;
