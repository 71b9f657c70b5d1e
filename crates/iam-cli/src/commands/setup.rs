//! Setup command implementation.

use std::path::{Path, PathBuf};

use iam_core::config::{KEYWORD_CONFIG_FILE, SERVER_CONFIG_FILE, TOOL_CONFIG_FILE};
use iam_core::resource::DEFAULT_TENANT_DOMAIN;
use iam_core::{KeywordConfig, ToolConfig};
use iam_keywords::{substitute_stripping_unknown, KeywordMapping};

use crate::cli::SetupArgs;
use crate::output::{info, success, warning};

/// Name of the config directory created under `<base>/configs`.
pub const DEFAULT_ENVIRONMENT: &str = "env";

/// Environment variables prefilled into the server config template.
const SERVER_KEYWORDS: [&str; 4] = ["SERVER_URL", "CLIENT_ID", "CLIENT_SECRET", "TENANT_DOMAIN"];

const SERVER_CONFIG_TEMPLATE: &str = r#"{
  "SERVER_URL": "{{SERVER_URL}}",
  "CLIENT_ID": "{{CLIENT_ID}}",
  "CLIENT_SECRET": "{{CLIENT_SECRET}}",
  "TENANT_DOMAIN": "{{TENANT_DOMAIN}}"
}"#;

/// Runs the setup command.
pub fn run_setup(args: SetupArgs) -> crate::CliResult<()> {
    let base_dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config_dir = write_config_templates(&base_dir, |name| std::env::var(name).ok())?;
    success(&format!("Config directory ready at '{}'", config_dir.display()));
    info(&format!(
        "Fill in {SERVER_CONFIG_FILE} and run: iamctl --config {} export-all",
        config_dir.display()
    ));
    Ok(())
}

/// Writes template config files under `<base_dir>/configs/env`, leaving
/// existing files untouched. Returns the config directory.
///
/// Server settings found through `lookup` are filled in; the rest are left
/// blank.
pub fn write_config_templates<F>(base_dir: &Path, lookup: F) -> crate::CliResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let config_dir = base_dir.join("configs").join(DEFAULT_ENVIRONMENT);
    std::fs::create_dir_all(&config_dir)?;

    let templates = [
        (SERVER_CONFIG_FILE, render_server_config(lookup)?),
        (TOOL_CONFIG_FILE, serde_json::to_string_pretty(&ToolConfig::default())?),
        (KEYWORD_CONFIG_FILE, serde_json::to_string_pretty(&KeywordConfig::default())?),
    ];

    for (name, content) in templates {
        let path = config_dir.join(name);
        if path.exists() {
            warning(&format!("Keeping existing {}", path.display()));
            continue;
        }
        std::fs::write(&path, content + "\n")?;
    }
    Ok(config_dir)
}

/// Renders the server config template. Unset settings are stripped.
fn render_server_config<F>(lookup: F) -> crate::CliResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut mapping = KeywordMapping::new().with("TENANT_DOMAIN", DEFAULT_TENANT_DOMAIN);
    for name in SERVER_KEYWORDS {
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            mapping = mapping.with(name, json_string_body(&value)?);
        }
    }
    Ok(substitute_stripping_unknown(SERVER_CONFIG_TEMPLATE, &mapping))
}

/// `value` escaped for use inside a JSON string literal.
fn json_string_body(value: &str) -> serde_json::Result<String> {
    let quoted = serde_json::to_string(value)?;
    Ok(quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted.as_str())
        .to_string())
}
