//! In-memory [`ResourceApi`] for command tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use iam_client::{ApiError, ApiResult, ExportedFile, ResourceApi, ResourceRef, UploadFile};
use iam_core::{ExportFormat, ResourceType};

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Export(ResourceType, String),
    Import(ResourceType, String),
    Update(ResourceType, String, String),
    Delete(ResourceType, String),
}

#[derive(Default)]
pub(crate) struct MockApi {
    deployed: BTreeMap<ResourceType, Vec<ResourceRef>>,
    exports: BTreeMap<(ResourceType, String), String>,
    import_statuses: Mutex<VecDeque<u16>>,
    update_statuses: Mutex<VecDeque<u16>>,
    calls: Mutex<Vec<Call>>,
    uploads: Mutex<Vec<UploadFile>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn deployed(mut self, resource_type: ResourceType, id: &str, name: &str) -> Self {
        self.deployed
            .entry(resource_type)
            .or_default()
            .push(ResourceRef::new(id, name));
        self
    }

    pub(crate) fn exporting(mut self, resource_type: ResourceType, id: &str, content: &str) -> Self {
        self.exports
            .insert((resource_type, id.to_string()), content.to_string());
        self
    }

    /// Statuses returned by successive imports; 201 once exhausted.
    pub(crate) fn import_statuses(self, statuses: &[u16]) -> Self {
        self.import_statuses
            .lock()
            .unwrap()
            .extend(statuses.iter().copied());
        self
    }

    /// Statuses returned by successive updates; 200 once exhausted.
    pub(crate) fn update_statuses(self, statuses: &[u16]) -> Self {
        self.update_statuses
            .lock()
            .unwrap()
            .extend(statuses.iter().copied());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn uploads(&self) -> Vec<UploadFile> {
        self.uploads.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn respond(statuses: &Mutex<VecDeque<u16>>, ok: u16) -> ApiResult<()> {
        match statuses.lock().unwrap().pop_front() {
            Some(status) if status != ok => Err(ApiError::from_status(status, "")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceApi for MockApi {
    async fn list(&self, resource_type: ResourceType) -> ApiResult<Vec<ResourceRef>> {
        Ok(self.deployed.get(&resource_type).cloned().unwrap_or_default())
    }

    async fn export(
        &self,
        resource_type: ResourceType,
        id: &str,
        _format: ExportFormat,
        _exclude_secrets: bool,
    ) -> ApiResult<ExportedFile> {
        self.record(Call::Export(resource_type, id.to_string()));
        self.exports
            .get(&(resource_type, id.to_string()))
            .map(|content| ExportedFile {
                filename: None,
                content: content.clone().into_bytes(),
            })
            .ok_or_else(|| ApiError::from_status(404, ""))
    }

    async fn import(&self, resource_type: ResourceType, file: &UploadFile) -> ApiResult<()> {
        self.record(Call::Import(resource_type, file.filename.clone()));
        self.uploads.lock().unwrap().push(file.clone());
        Self::respond(&self.import_statuses, 201)
    }

    async fn update(
        &self,
        resource_type: ResourceType,
        id: &str,
        file: &UploadFile,
    ) -> ApiResult<()> {
        self.record(Call::Update(resource_type, id.to_string(), file.filename.clone()));
        self.uploads.lock().unwrap().push(file.clone());
        Self::respond(&self.update_statuses, 200)
    }

    async fn delete(&self, resource_type: ResourceType, id: &str) -> ApiResult<()> {
        self.record(Call::Delete(resource_type, id.to_string()));
        Ok(())
    }
}
