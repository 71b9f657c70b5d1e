//! CLI defaults.

use std::path::PathBuf;

use iam_core::ExportFormat;
use serde::{Deserialize, Serialize};

/// Defaults read from `~/.iamctl/iamctl.toml`. Command line flags win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Migration config directory used when `--config` is not given.
    pub config_dir: Option<PathBuf>,

    /// Export format used when `--format` is not given.
    #[serde(default)]
    pub format: ExportFormat,
}

impl CliConfig {
    /// Loads configuration from file.
    pub fn load() -> crate::CliResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses configuration text.
    pub fn from_toml(content: &str) -> crate::CliResult<Self> {
        toml::from_str(content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Gets the configuration file path.
    pub fn config_path() -> crate::CliResult<PathBuf> {
        let home = dirs_next::home_dir().ok_or_else(|| {
            crate::CliError::Config("could not determine home directory".to_string())
        })?;
        Ok(home.join(".iamctl").join("iamctl.toml"))
    }

    /// Gets the effective config directory (from args or config).
    pub fn effective_config_dir(&self, arg_dir: Option<PathBuf>) -> Option<PathBuf> {
        arg_dir.or_else(|| self.config_dir.clone())
    }
}
