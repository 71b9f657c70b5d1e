//! Export command implementation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use iam_client::{ResourceApi, ResourceRef};
use iam_core::{ExportFormat, MigrationConfig, ResourceType, MASKED_SECRET, RESIDENT_IDP_NAME};
use iam_keywords::{process_exported_document, Document, IdentifierTable};

use crate::cli::ExportArgs;
use crate::output::{error, info, success, warning};
use crate::resources::files::remove_stale_files;
use crate::resources::{ResourceKind, USER_STORE_SECRET_MASK};
use crate::summary::Summary;
use crate::CliConfig;

use super::{connect, load_migration_config};

/// Runs the export command.
pub async fn run_export(
    args: ExportArgs,
    config: &CliConfig,
    config_dir: Option<PathBuf>,
) -> crate::CliResult<()> {
    let migration = load_migration_config(config.effective_config_dir(config_dir).as_deref())?;
    let api = connect(&migration).await?;

    let output_dir = args.output.unwrap_or_else(|| migration.base_dir.clone());
    let format = args.format.unwrap_or(config.format);

    info(&format!(
        "Exporting resources to '{}' as {format}...",
        output_dir.display()
    ));

    let mut summary = Summary::default();
    export_all(&api, &migration, &output_dir, format, &mut summary).await;

    summary.print_export();
    if summary.failed == 0 {
        success("Export complete!");
    } else {
        warning(&format!("Export finished with {} failure(s).", summary.failed));
    }
    Ok(())
}

/// Exports every resource type into `output_dir`.
///
/// A type whose listing fails is reported and skipped; the others still run.
pub async fn export_all(
    api: &dyn ResourceApi,
    config: &MigrationConfig,
    output_dir: &Path,
    format: ExportFormat,
    summary: &mut Summary,
) {
    for kind in ResourceKind::all() {
        if let Err(e) = export_type(api, config, kind, output_dir, format, summary).await {
            error(&format!("Error exporting {}: {e}", kind.resource_type()));
        }
    }
}

async fn export_type(
    api: &dyn ResourceApi,
    config: &MigrationConfig,
    kind: ResourceKind,
    output_dir: &Path,
    format: ExportFormat,
    summary: &mut Summary,
) -> crate::CliResult<()> {
    let resource_type = kind.resource_type();
    info(&format!("Exporting {resource_type}..."));

    let dir = kind.directory(output_dir);
    let existed = dir.is_dir();
    std::fs::create_dir_all(&dir)?;

    let mut resources = api.list(resource_type).await?;
    if resource_type == ResourceType::IdentityProviders
        && !resources.iter().any(|r| r.name == RESIDENT_IDP_NAME)
    {
        resources.push(ResourceRef::new(RESIDENT_IDP_NAME, RESIDENT_IDP_NAME));
    }

    if config.tool.allow_delete && existed {
        let deployed: BTreeSet<String> =
            resources.iter().map(|r| kind.file_stem(&r.name)).collect();
        for _ in remove_stale_files(&dir, &deployed)? {
            summary.record_delete(resource_type);
        }
    }

    let type_config = config.tool.resource(resource_type);
    let exclude_secrets = kind.secrets_excluded(&config.tool);
    if resource_type == ResourceType::UserStores && !exclude_secrets {
        warning("Secrets exclusion cannot be disabled for user stores. All secrets will be masked.");
    }
    let identifiers = kind.identifiers(&config.tool);

    for resource in &resources {
        if type_config.is_excluded(&resource.name) {
            continue;
        }
        tracing::info!("Exporting {resource_type}: {}", resource.name);

        let exported = export_resource(
            api,
            config,
            kind,
            resource,
            &dir,
            format,
            exclude_secrets,
            &identifiers,
        )
        .await;
        match exported {
            Ok(path) => {
                tracing::info!("Exported {} to {}", resource.name, path.display());
                summary.record_export(resource_type);
            }
            Err(e) => {
                error(&format!("Failed to export {}: {e}", resource.name));
                summary.record_failure(resource_type, &resource.name);
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn export_resource(
    api: &dyn ResourceApi,
    config: &MigrationConfig,
    kind: ResourceKind,
    resource: &ResourceRef,
    dir: &Path,
    format: ExportFormat,
    exclude_secrets: bool,
    identifiers: &IdentifierTable,
) -> crate::CliResult<PathBuf> {
    let resource_type = kind.resource_type();
    let exported = api
        .export(resource_type, &resource.id, format, exclude_secrets)
        .await?;

    let suffix = format!(".{}", format.extension());
    let stem = exported
        .filename
        .as_deref()
        .and_then(|name| name.strip_suffix(&suffix))
        .unwrap_or(&resource.name);
    let path = dir.join(format!("{}{suffix}", kind.file_stem(stem)));

    let local = match std::fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let content = if format == ExportFormat::Xml {
        if resource_type == ResourceType::UserStores {
            String::from_utf8_lossy(&exported.content)
                .replace(USER_STORE_SECRET_MASK, MASKED_SECRET)
                .into_bytes()
        } else {
            exported.content
        }
    } else {
        let mut document = Document::from_yaml(&String::from_utf8_lossy(&exported.content))?;
        if resource_type == ResourceType::UserStores {
            document.replace_string_values(USER_STORE_SECRET_MASK, MASKED_SECRET);
        }
        let mapping = kind.keyword_mapping(&config.keywords, &resource.name);
        process_exported_document(document, local.as_deref(), &mapping, identifiers, format)?
    };

    std::fs::write(&path, content)?;
    Ok(path)
}
