//! Test harness: a mock management API and a scratch resource directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use iam_client::ApiClient;
use iam_core::{MigrationConfig, ResourceType, ServerConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path prefix of the tenant's management API.
pub const API_BASE: &str = "/t/carbon.super/api/server/v1";

/// Mock server, client and resource directory of one test.
pub struct TestEnv {
    /// Mock management API.
    pub server: MockServer,
    /// Client pointed at the mock.
    pub api: ApiClient,
    /// Migration config using the scratch directory as base.
    pub config: MigrationConfig,
    dir: TempDir,
}

impl TestEnv {
    /// Starts the mock server and creates an empty resource directory.
    pub async fn new() -> anyhow::Result<Self> {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;

        let mut server_config = ServerConfig {
            server_url: server.uri(),
            token: Some("test-token".to_string()),
            ..ServerConfig::default()
        };
        server_config.sanitize();

        let api = ApiClient::connect(&server_config, Duration::from_secs(5)).await?;
        let config = MigrationConfig {
            server: server_config,
            base_dir: dir.path().to_path_buf(),
            ..MigrationConfig::default()
        };

        Ok(Self {
            server,
            api,
            config,
            dir,
        })
    }

    /// Base directory of local resource files.
    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a local file relative to the base directory.
    pub fn local_path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes a local resource file.
    pub fn write_local(&self, relative: &str, content: &str) -> anyhow::Result<()> {
        let path = self.local_path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reads a local resource file.
    pub fn read_local(&self, relative: &str) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(self.local_path(relative))?)
    }

    /// Serves the deployed resource list of a type. `entries` are
    /// `(id, name)` pairs.
    pub async fn mount_list(&self, resource_type: ResourceType, entries: &[(&str, &str)]) {
        let body = list_body(resource_type, entries);
        Mock::given(method("GET"))
            .and(path(format!("{API_BASE}/{}", resource_type.api_path())))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Serves empty lists for every type not mounted yet.
    pub async fn mount_empty_lists(&self, except: &[ResourceType]) {
        for resource_type in ResourceType::ALL {
            if !except.contains(&resource_type) {
                self.mount_list(resource_type, &[]).await;
            }
        }
    }
}

fn list_body(resource_type: ResourceType, entries: &[(&str, &str)]) -> Value {
    match resource_type {
        ResourceType::Applications => json!({
            "totalResults": entries.len(),
            "applications": entries
                .iter()
                .map(|(id, name)| json!({"id": id, "name": name}))
                .collect::<Vec<_>>(),
        }),
        ResourceType::IdentityProviders => json!({
            "totalResults": entries.len(),
            "identityProviders": entries
                .iter()
                .map(|(id, name)| json!({"id": id, "name": name}))
                .collect::<Vec<_>>(),
        }),
        ResourceType::ClaimDialects => Value::Array(
            entries
                .iter()
                .map(|(id, uri)| json!({"id": id, "dialectURI": uri}))
                .collect(),
        ),
        ResourceType::UserStores => Value::Array(
            entries
                .iter()
                .map(|(id, name)| json!({"id": id, "name": name}))
                .collect(),
        ),
    }
}
