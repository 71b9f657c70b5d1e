//! Core error types.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A config file is not valid JSON for its schema.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns whether the error came from the filesystem rather than content.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message() {
        let error = Error::Config("SERVER_URL is not set".to_string());
        assert_eq!(error.to_string(), "configuration error: SERVER_URL is not set");
        assert!(!error.is_io());
    }
}
