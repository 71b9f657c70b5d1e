//! Resource operations of the management API.

use async_trait::async_trait;
use iam_core::{ExportFormat, ResourceType};

use crate::error::ApiResult;

/// A deployed resource as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Server side identifier.
    pub id: String,
    /// Display name. For claim dialects this is the dialect URI.
    pub name: String,
}

impl ResourceRef {
    /// Creates a reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Content of an exported resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// File name suggested by the server.
    pub filename: Option<String>,
    /// Raw file content.
    pub content: Vec<u8>,
}

/// A local file sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name, including the extension.
    pub filename: String,
    /// Content after keyword substitution.
    pub content: Vec<u8>,
    /// Format of `content`.
    pub format: ExportFormat,
}

/// Operations the migration commands need from the server.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Lists deployed resources.
    async fn list(&self, resource_type: ResourceType) -> ApiResult<Vec<ResourceRef>>;

    /// Exports one resource.
    async fn export(
        &self,
        resource_type: ResourceType,
        id: &str,
        format: ExportFormat,
        exclude_secrets: bool,
    ) -> ApiResult<ExportedFile>;

    /// Creates a resource from a file.
    async fn import(&self, resource_type: ResourceType, file: &UploadFile) -> ApiResult<()>;

    /// Replaces an existing resource with a file.
    async fn update(
        &self,
        resource_type: ResourceType,
        id: &str,
        file: &UploadFile,
    ) -> ApiResult<()>;

    /// Deletes a resource.
    async fn delete(&self, resource_type: ResourceType, id: &str) -> ApiResult<()>;
}
