//! Local resource files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use iam_core::ExportFormat;

/// A resource file found in a type directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Full path.
    pub path: PathBuf,
    /// File name without extension.
    pub stem: String,
    /// Format detected from the extension.
    pub format: ExportFormat,
}

impl LocalFile {
    /// File name including the extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.stem.clone(), |n| n.to_string_lossy().into_owned())
    }
}

/// Lists resource files of `dir`, sorted by name.
///
/// Files with an unknown extension are skipped with a warning.
pub fn list_resource_files(dir: &Path) -> std::io::Result<Vec<LocalFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let (Some(stem), Some(extension)) = (path.file_stem(), path.extension()) else {
            tracing::warn!("Skipping file without extension: {}", path.display());
            continue;
        };
        match ExportFormat::from_extension(&extension.to_string_lossy()) {
            Some(format) => files.push(LocalFile {
                stem: stem.to_string_lossy().into_owned(),
                path,
                format,
            }),
            None => tracing::warn!("Skipping unsupported file: {}", path.display()),
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Removes files of `dir` whose stem matches none of `deployed_stems`,
/// ignoring case. Returns the removed paths.
pub fn remove_stale_files(
    dir: &Path,
    deployed_stems: &BTreeSet<String>,
) -> std::io::Result<Vec<PathBuf>> {
    let deployed: BTreeSet<String> = deployed_stems.iter().map(|s| s.to_lowercase()).collect();
    let mut removed = Vec::new();
    for file in list_resource_files(dir)? {
        if deployed.contains(&file.stem.to_lowercase()) {
            continue;
        }
        std::fs::remove_file(&file.path)?;
        tracing::info!("Removed the file: {}", file.path.display());
        removed.push(file.path);
    }
    Ok(removed)
}
