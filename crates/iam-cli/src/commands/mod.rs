//! Command implementations.

pub mod export;
pub mod import;
pub mod setup;

#[cfg(test)]
pub(crate) mod testing;

pub use export::{export_all, run_export};
pub use import::{import_all, run_import};
pub use setup::run_setup;

use std::path::Path;
use std::time::Duration;

use iam_client::ApiClient;
use iam_core::{ExportFormat, MigrationConfig};
use iam_keywords::Document;

/// Loads and validates the migration config.
pub fn load_migration_config(config_dir: Option<&Path>) -> crate::CliResult<MigrationConfig> {
    let config = MigrationConfig::load(config_dir)?;
    config.server.validate()?;
    Ok(config)
}

/// Connects to the configured server.
pub async fn connect(config: &MigrationConfig) -> crate::CliResult<ApiClient> {
    let timeout = Duration::from_secs(config.tool.request_timeout_secs);
    let client = ApiClient::connect(&config.server, timeout).await?;
    tracing::debug!("Connected to {}", client.base_url());
    Ok(client)
}

/// Parses resource file text. XML and unparseable text give `None`.
pub(crate) fn parse_document(text: &str, format: ExportFormat) -> Option<Document> {
    if format == ExportFormat::Xml {
        return None;
    }
    match Document::from_yaml(text) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!("Could not parse resource file: {e}");
            None
        }
    }
}
