//! Reconciliation of exported resources with local keyword templates.
//!
//! A local file may hold `{{NAME}}` placeholders where an operator wants an
//! environment specific value. When the resource is exported again, each
//! placeholder field is compared with the server's value: if the template
//! still resolves to what the server holds, the placeholder is written back
//! into the exported document; otherwise the server value is kept and the
//! divergence is reported.

use iam_core::{ExportFormat, MASKED_SECRET};

use crate::document::{Document, Scalar};
use crate::error::KeywordResult;
use crate::mapping::{IdentifierTable, KeywordMapping};
use crate::path::Path;
use crate::scanner::find_keyword_locations;
use crate::substitute::substitute;

/// A field whose server value no longer matches the local template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Field location.
    pub path: Path,
    /// Local value with keywords resolved.
    pub local_resolved: String,
    /// Value the server exported.
    pub exported: String,
}

/// Outcome of reconciling one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Fields where the local placeholder was kept.
    pub preserved: Vec<Path>,
    /// Fields where the exported value was kept.
    pub diverged: Vec<Divergence>,
}

/// Merged document with its report.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Exported document with placeholders restored.
    pub document: Document,
    /// What happened per keyword location.
    pub report: ReconcileReport,
}

/// Restores local placeholders into an exported document.
///
/// With no local document the exported one is returned unchanged. Each
/// keyword location of `local` is decided on its own, so the result does
/// not depend on the order locations are visited in.
#[must_use]
pub fn reconcile(
    mut exported: Document,
    local: Option<&Document>,
    mapping: &KeywordMapping,
    identifiers: &IdentifierTable,
) -> Reconciliation {
    let mut report = ReconcileReport::default();

    let Some(local) = local else {
        return Reconciliation {
            document: exported,
            report,
        };
    };

    for path in find_keyword_locations(local, mapping, identifiers) {
        let local_node = local.get(&path);
        let local_value = local_node.map(Document::render).unwrap_or_default();
        let local_resolved = substitute(&local_value, mapping);
        let exported_value = exported.get(&path).map(Document::render).unwrap_or_default();

        let matches = exported_value == local_resolved || exported_value == MASKED_SECRET;

        if matches {
            let template = local_node
                .cloned()
                .unwrap_or_else(|| Document::Scalar(Scalar::String(local_value)));
            if exported.set(&path, template) {
                tracing::debug!("Keyword kept at {path}");
                report.preserved.push(path);
            }
        } else {
            tracing::warn!(
                "Keywords at {path} will be replaced by exported content. \
                 Local value with keywords replaced: {local_resolved}, exported value: {exported_value}"
            );
            report.diverged.push(Divergence {
                path,
                local_resolved,
                exported: exported_value,
            });
        }
    }

    Reconciliation {
        document: exported,
        report,
    }
}

/// Reconciles raw exported content with the raw local file and serializes
/// the result in `format`.
///
/// The exported content must parse. A missing, empty or unparseable local
/// file is treated as absent. XML is stored exactly as exported.
pub fn process_exported_content(
    exported: &[u8],
    local: Option<&[u8]>,
    mapping: &KeywordMapping,
    identifiers: &IdentifierTable,
    format: ExportFormat,
) -> KeywordResult<Vec<u8>> {
    if format == ExportFormat::Xml {
        return Ok(exported.to_vec());
    }

    let exported = Document::from_yaml(&String::from_utf8_lossy(exported))?;
    process_exported_document(exported, local, mapping, identifiers, format)
}

/// Like [`process_exported_content`], for an export that is already parsed.
///
/// `format` must be YAML or JSON; XML is written as YAML.
pub fn process_exported_document(
    exported: Document,
    local: Option<&[u8]>,
    mapping: &KeywordMapping,
    identifiers: &IdentifierTable,
    format: ExportFormat,
) -> KeywordResult<Vec<u8>> {
    let local = local.and_then(parse_local);
    let merged = reconcile(exported, local.as_ref(), mapping, identifiers);

    let text = match format {
        ExportFormat::Json => merged.document.to_json()?,
        ExportFormat::Yaml | ExportFormat::Xml => merged.document.to_yaml()?,
    };
    Ok(text.into_bytes())
}

fn parse_local(bytes: &[u8]) -> Option<Document> {
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        tracing::warn!("Local file is empty, overriding it with exported content");
        return None;
    }
    match Document::from_yaml(&text) {
        Ok(Document::Scalar(Scalar::Null)) => None,
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!("Invalid local file, overriding it with exported content: {e}");
            None
        }
    }
}
