//! Import command implementation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use iam_client::{ApiResult, ResourceApi, ResourceRef, UploadFile};
use iam_core::{MigrationConfig, ResourceType, MASKED_SECRET};
use iam_keywords::{referenced_keywords, substitute, Document};

use crate::cli::ImportArgs;
use crate::output::{error, info, success, warning};
use crate::resources::files::{list_resource_files, LocalFile};
use crate::resources::ResourceKind;
use crate::summary::Summary;
use crate::CliConfig;

use super::{connect, load_migration_config, parse_document};

/// What an import did on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Updated,
}

/// Runs the import command.
pub async fn run_import(
    args: ImportArgs,
    config: &CliConfig,
    config_dir: Option<PathBuf>,
) -> crate::CliResult<()> {
    let migration = load_migration_config(config.effective_config_dir(config_dir).as_deref())?;
    let api = connect(&migration).await?;

    let input_dir = args.input.unwrap_or_else(|| migration.base_dir.clone());
    info(&format!("Importing resources from '{}'...", input_dir.display()));

    let mut summary = Summary::default();
    import_all(&api, &migration, &input_dir, &mut summary).await;

    summary.print_import();
    if summary.failed == 0 {
        success("Import complete!");
    } else {
        warning(&format!("Import finished with {} failure(s).", summary.failed));
    }
    Ok(())
}

/// Imports the local files of every resource type from `input_dir`.
pub async fn import_all(
    api: &dyn ResourceApi,
    config: &MigrationConfig,
    input_dir: &Path,
    summary: &mut Summary,
) {
    for kind in ResourceKind::all() {
        if let Err(e) = import_type(api, config, kind, input_dir, summary).await {
            error(&format!("Error importing {}: {e}", kind.resource_type()));
        }
    }
}

async fn import_type(
    api: &dyn ResourceApi,
    config: &MigrationConfig,
    kind: ResourceKind,
    input_dir: &Path,
    summary: &mut Summary,
) -> crate::CliResult<()> {
    let resource_type = kind.resource_type();
    let dir = kind.directory(input_dir);
    if !dir.is_dir() {
        info(&format!("No {resource_type} to import."));
        return Ok(());
    }
    info(&format!("Importing {resource_type}..."));

    let files = list_resource_files(&dir)?;
    let deployed = api.list(resource_type).await?;

    for file in &files {
        if let Err(e) = import_file(api, config, kind, file, &deployed, summary).await {
            error(&format!("Failed to import {}: {e}", file.file_name()));
            summary.record_failure(resource_type, &file.stem);
        }
    }

    if config.tool.allow_delete {
        delete_missing(api, config, kind, &deployed, &files, summary).await;
    }
    Ok(())
}

/// Deletes deployed resources that have no local file.
async fn delete_missing(
    api: &dyn ResourceApi,
    config: &MigrationConfig,
    kind: ResourceKind,
    deployed: &[ResourceRef],
    files: &[LocalFile],
    summary: &mut Summary,
) {
    let resource_type = kind.resource_type();
    let type_config = config.tool.resource(resource_type);
    let local: BTreeSet<String> = files.iter().map(|f| f.stem.to_lowercase()).collect();

    for resource in deployed {
        if kind.is_protected(&resource.name)
            || local.contains(&kind.file_stem(&resource.name).to_lowercase())
            || type_config.is_excluded(&resource.name)
        {
            continue;
        }
        match api.delete(resource_type, &resource.id).await {
            Ok(()) => {
                info(&format!("Deleted {resource_type}: {}", resource.name));
                summary.record_delete(resource_type);
            }
            Err(e) => {
                error(&format!("Failed to delete {}: {e}", resource.name));
                summary.record_failure(resource_type, &resource.name);
            }
        }
    }
}

async fn import_file(
    api: &dyn ResourceApi,
    config: &MigrationConfig,
    kind: ResourceKind,
    file: &LocalFile,
    deployed: &[ResourceRef],
    summary: &mut Summary,
) -> crate::CliResult<()> {
    let resource_type = kind.resource_type();
    let raw = std::fs::read_to_string(&file.path)?;
    let name = kind.local_name(&file.stem, parse_document(&raw, file.format).as_ref());
    if config.tool.resource(resource_type).is_excluded(&name) {
        return Ok(());
    }

    let mapping = kind.keyword_mapping(&config.keywords, &name);
    let content = substitute(&raw, &mapping);
    let unresolved: BTreeSet<&str> = referenced_keywords(&content).into_iter().collect();
    for keyword in unresolved {
        tracing::warn!("No value mapped for keyword {keyword} in {}", file.file_name());
    }

    let document = parse_document(&content, file.format);
    let target = kind
        .find_deployed(&file.stem, document.as_ref(), deployed)
        .map(|r| r.id);
    let upload = UploadFile {
        filename: file.file_name(),
        content: content.into_bytes(),
        format: file.format,
    };

    tracing::info!("Importing {resource_type}: {name}");
    let outcome = create_or_update(api, kind, target, &file.stem, document.as_ref(), &upload).await?;
    match outcome {
        Outcome::Created => {
            tracing::info!("Created {resource_type}: {name}");
            summary.record_import(resource_type);
        }
        Outcome::Updated => {
            tracing::info!("Updated {resource_type}: {name}");
            summary.record_update(resource_type);
        }
    }

    if resource_type == ResourceType::Applications
        && String::from_utf8_lossy(&upload.content).contains(MASKED_SECRET)
    {
        summary.record_new_secret(&name);
    }
    Ok(())
}

/// Creates the resource, or updates `target` when it is deployed.
///
/// A create rejected as a duplicate is retried once as an update.
async fn create_or_update(
    api: &dyn ResourceApi,
    kind: ResourceKind,
    mut target: Option<String>,
    stem: &str,
    document: Option<&Document>,
    upload: &UploadFile,
) -> ApiResult<Outcome> {
    let resource_type = kind.resource_type();
    let mut retried = false;

    loop {
        let result = match &target {
            Some(id) => api
                .update(resource_type, id, upload)
                .await
                .map(|()| Outcome::Updated),
            None => api
                .import(resource_type, upload)
                .await
                .map(|()| Outcome::Created),
        };

        match result {
            Err(e) if e.is_conflict() && target.is_none() && !retried => {
                tracing::warn!("{resource_type} {stem} already exists, updating it instead");
                retried = true;
                target = Some(conflicting_id(api, kind, stem, document).await);
            }
            other => return other,
        }
    }
}

/// Id of the resource a create collided with.
async fn conflicting_id(
    api: &dyn ResourceApi,
    kind: ResourceKind,
    stem: &str,
    document: Option<&Document>,
) -> String {
    let found = match api.list(kind.resource_type()).await {
        Ok(deployed) => kind.find_deployed(stem, document, &deployed).map(|r| r.id),
        Err(e) => {
            tracing::debug!("Could not refresh {} list: {e}", kind.resource_type());
            None
        }
    };
    found.unwrap_or_else(|| kind.fallback_id(stem, document))
}
