//! Migration configuration.
//!
//! A config directory holds three JSON files:
//! - `serverConfig.json`: server URL, client credentials and tenant
//! - `toolConfig.json`: per resource type filters and deletion policy
//! - `keywordConfig.json`: keyword mappings, default and per resource
//!
//! Without a directory, server settings come from environment variables and
//! the tool and keyword files are located through `TOOL_CONFIG_PATH` and
//! `KEYWORD_CONFIG_PATH`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resource::{ResourceType, DEFAULT_TENANT_DOMAIN};

/// Server config file name.
pub const SERVER_CONFIG_FILE: &str = "serverConfig.json";
/// Tool config file name.
pub const TOOL_CONFIG_FILE: &str = "toolConfig.json";
/// Keyword config file name.
pub const KEYWORD_CONFIG_FILE: &str = "keywordConfig.json";

/// Environment variable pointing at the tool config file.
pub const TOOL_CONFIG_PATH_ENV: &str = "TOOL_CONFIG_PATH";
/// Environment variable pointing at the keyword config file.
pub const KEYWORD_CONFIG_PATH_ENV: &str = "KEYWORD_CONFIG_PATH";

/// Connection settings for the target server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server base URL (e.g., https://localhost:9443).
    #[serde(rename = "SERVER_URL", default)]
    pub server_url: String,

    /// OAuth client ID used for the client-credentials grant.
    #[serde(rename = "CLIENT_ID", default)]
    pub client_id: String,

    /// OAuth client secret.
    #[serde(rename = "CLIENT_SECRET", default)]
    pub client_secret: String,

    /// Tenant domain.
    #[serde(rename = "TENANT_DOMAIN", default)]
    pub tenant_domain: String,

    /// Pre-issued access token. When set no token request is made.
    #[serde(rename = "TOKEN", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ServerConfig {
    /// Reads server settings from environment variables.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server_url: lookup("SERVER_URL").unwrap_or_default(),
            client_id: lookup("CLIENT_ID").unwrap_or_default(),
            client_secret: lookup("CLIENT_SECRET").unwrap_or_default(),
            tenant_domain: lookup("TENANT_DOMAIN").unwrap_or_default(),
            token: lookup("TOKEN").filter(|t| !t.is_empty()),
        }
    }

    /// Trims the trailing slash from the URL and fills in the default tenant.
    pub fn sanitize(&mut self) {
        while self.server_url.ends_with('/') {
            self.server_url.pop();
        }
        if self.tenant_domain.is_empty() {
            tracing::info!("Tenant domain not defined, defaulting to {DEFAULT_TENANT_DOMAIN}");
            self.tenant_domain = DEFAULT_TENANT_DOMAIN.to_string();
        }
    }

    /// Checks that a run can reach the server.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(Error::Config("SERVER_URL is not defined".to_string()));
        }
        if self.token.is_none() && self.client_id.is_empty() {
            return Err(Error::Config(
                "CLIENT_ID is required when no TOKEN is configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL of the tenant's management API.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!("{}/t/{}/api/server/v1", self.server_url, self.tenant_domain)
    }

    /// URL of the tenant's token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/t/{}/oauth2/token", self.server_url, self.tenant_domain)
    }
}

/// Filters and options for one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTypeConfig {
    /// Resource names to skip.
    #[serde(rename = "EXCLUDE", default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// When set, only these resource names are processed.
    #[serde(rename = "INCLUDE_ONLY", default, skip_serializing_if = "Option::is_none")]
    pub include_only: Option<Vec<String>>,

    /// Whether secrets are withheld from exports.
    #[serde(rename = "EXCLUDE_SECRETS", default, skip_serializing_if = "Option::is_none")]
    pub exclude_secrets: Option<bool>,

    /// Extra or overriding array identifier fields.
    #[serde(
        rename = "ARRAY_IDENTIFIERS",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub array_identifiers: BTreeMap<String, String>,
}

impl ResourceTypeConfig {
    /// Returns whether a resource is filtered out.
    ///
    /// `INCLUDE_ONLY` overrides `EXCLUDE` when both are present.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        let excluded = match &self.include_only {
            Some(include) => !include.iter().any(|n| n == name),
            None => self.exclude.iter().any(|n| n == name),
        };
        if excluded {
            tracing::info!("Excluded resource: {name}");
        }
        excluded
    }

    /// Returns whether secrets are withheld. Defaults to `true`.
    #[must_use]
    pub fn secrets_excluded(&self) -> bool {
        self.exclude_secrets.unwrap_or(true)
    }
}

/// Tool behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Delete resources missing on the other side.
    #[serde(rename = "ALLOW_DELETE", default)]
    pub allow_delete: bool,

    /// Timeout applied to every HTTP request.
    #[serde(rename = "REQUEST_TIMEOUT_SECS", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Application settings.
    #[serde(rename = "APPLICATIONS", default)]
    pub applications: ResourceTypeConfig,

    /// Identity provider settings.
    #[serde(rename = "IDENTITY_PROVIDERS", default)]
    pub identity_providers: ResourceTypeConfig,

    /// Claim dialect settings.
    #[serde(rename = "CLAIM_DIALECTS", default)]
    pub claim_dialects: ResourceTypeConfig,

    /// User store settings.
    #[serde(rename = "USERSTORES", default)]
    pub user_stores: ResourceTypeConfig,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            allow_delete: false,
            request_timeout_secs: default_request_timeout(),
            applications: ResourceTypeConfig::default(),
            identity_providers: ResourceTypeConfig::default(),
            claim_dialects: ResourceTypeConfig::default(),
            user_stores: ResourceTypeConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Settings for a resource type.
    #[must_use]
    pub const fn resource(&self, resource_type: ResourceType) -> &ResourceTypeConfig {
        match resource_type {
            ResourceType::Applications => &self.applications,
            ResourceType::IdentityProviders => &self.identity_providers,
            ResourceType::ClaimDialects => &self.claim_dialects,
            ResourceType::UserStores => &self.user_stores,
        }
    }
}

/// Keyword mappings of one named resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceKeywords {
    /// Mappings overriding the defaults for this resource.
    #[serde(rename = "KEYWORD_MAPPINGS", default)]
    pub keyword_mappings: BTreeMap<String, serde_json::Value>,
}

/// Keyword mapping configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Mappings applied to every resource.
    #[serde(rename = "KEYWORD_MAPPINGS", default)]
    pub keyword_mappings: BTreeMap<String, serde_json::Value>,

    /// Per application overrides, keyed by application name.
    #[serde(rename = "APPLICATIONS", default)]
    pub applications: BTreeMap<String, ResourceKeywords>,

    /// Per identity provider overrides.
    #[serde(rename = "IDENTITY_PROVIDERS", default)]
    pub identity_providers: BTreeMap<String, ResourceKeywords>,

    /// Per claim dialect overrides.
    #[serde(rename = "CLAIM_DIALECTS", default)]
    pub claim_dialects: BTreeMap<String, ResourceKeywords>,

    /// Per user store overrides.
    #[serde(rename = "USERSTORES", default)]
    pub user_stores: BTreeMap<String, ResourceKeywords>,
}

impl KeywordConfig {
    /// Parses keyword config text, expanding `${VAR}` placeholders first.
    pub fn from_json_str<F>(text: &str, lookup: F) -> std::result::Result<Self, serde_json::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&expand_env_placeholders(text, lookup))
    }

    /// Default mappings as literal strings.
    #[must_use]
    pub fn defaults(&self) -> BTreeMap<String, String> {
        stringify_mappings(&self.keyword_mappings)
    }

    /// Mappings configured for one named resource, if any.
    #[must_use]
    pub fn overrides(
        &self,
        resource_type: ResourceType,
        resource_name: &str,
    ) -> Option<BTreeMap<String, String>> {
        let section = match resource_type {
            ResourceType::Applications => &self.applications,
            ResourceType::IdentityProviders => &self.identity_providers,
            ResourceType::ClaimDialects => &self.claim_dialects,
            ResourceType::UserStores => &self.user_stores,
        };
        section
            .get(resource_name)
            .map(|r| stringify_mappings(&r.keyword_mappings))
    }
}

/// Converts JSON mapping values to literal replacement strings.
///
/// Numbers and booleans are written in their JSON form; nested values are
/// dropped with a warning.
fn stringify_mappings(values: &BTreeMap<String, serde_json::Value>) -> BTreeMap<String, String> {
    values
        .iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key.clone(), s.clone())),
            serde_json::Value::Number(n) => Some((key.clone(), n.to_string())),
            serde_json::Value::Bool(b) => Some((key.clone(), b.to_string())),
            other => {
                tracing::warn!("Ignoring keyword {key}: unsupported value {other}");
                None
            }
        })
        .collect()
}

/// Replaces `${NAME}` with the value of environment variable `NAME`.
///
/// Unset variables are left untouched.
pub fn expand_env_placeholders<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) if !name.is_empty() => out.push_str(&value),
                    _ => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Complete configuration of one run.
#[derive(Debug, Clone, Default)]
pub struct MigrationConfig {
    /// Server connection settings.
    pub server: ServerConfig,
    /// Tool behaviour settings.
    pub tool: ToolConfig,
    /// Keyword mappings.
    pub keywords: KeywordConfig,
    /// Directory under which the resource type directories live.
    pub base_dir: PathBuf,
}

impl MigrationConfig {
    /// Loads from a config directory, or from the environment when `None`.
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        match config_dir {
            Some(dir) => Self::load_from_dir(dir),
            None => Self::load_from_env(|key| std::env::var(key).ok()),
        }
    }

    /// Loads the three config files from a directory.
    ///
    /// The base directory is two levels above the config directory
    /// (`<base>/configs/<env>`).
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        tracing::info!("Loading configs from {}", dir.display());

        let server_path = dir.join(SERVER_CONFIG_FILE);
        let mut server: ServerConfig = read_json(&server_path)?;
        server.sanitize();

        let tool = read_tool_config(&dir.join(TOOL_CONFIG_FILE))?;
        let keywords = read_keyword_config(&dir.join(KEYWORD_CONFIG_FILE), |key| {
            std::env::var(key).ok()
        })?;

        let base_dir = dir
            .parent()
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(Self {
            server,
            tool,
            keywords,
            base_dir,
        })
    }

    /// Loads server settings from environment variables and the tool and
    /// keyword files from the paths they name.
    ///
    /// The base directory is three levels above the tool config file.
    pub fn load_from_env<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::info!("Loading configs from environment variables");

        let mut server = ServerConfig::from_env(&lookup);
        server.sanitize();

        let tool_path = lookup(TOOL_CONFIG_PATH_ENV).map(PathBuf::from);
        let keyword_path = lookup(KEYWORD_CONFIG_PATH_ENV).map(PathBuf::from);

        let tool = match &tool_path {
            Some(path) => read_tool_config(path)?,
            None => ToolConfig::default(),
        };
        let keywords = match &keyword_path {
            Some(path) => read_keyword_config(path, &lookup)?,
            None => KeywordConfig::default(),
        };

        let base_dir = tool_path
            .as_deref()
            .and_then(Path::parent)
            .and_then(Path::parent)
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(Self {
            server,
            tool,
            keywords,
            base_dir,
        })
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let text = read_text(path)?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_tool_config(path: &Path) -> Result<ToolConfig> {
    let tool = read_json(path)?;
    tracing::debug!("Tool configs loaded from {}", path.display());
    Ok(tool)
}

fn read_keyword_config<F>(path: &Path, lookup: F) -> Result<KeywordConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let text = read_text(path)?;
    let keywords = KeywordConfig::from_json_str(&text, lookup).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Keyword configs loaded from {}", path.display());
    Ok(keywords)
}
