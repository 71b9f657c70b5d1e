//! Per run counters printed after a batch.

use std::collections::BTreeMap;

use iam_core::ResourceType;
use tabled::Tabled;

use crate::output::{self, warning};

/// Counters of one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSummary {
    /// Resources written to local files.
    pub exported: usize,
    /// Resources created on the server.
    pub imported: usize,
    /// Resources updated on the server.
    pub updated: usize,
    /// Resources deleted, remotely on import or locally on export.
    pub deleted: usize,
    /// Names of resources whose operation failed.
    pub failed: Vec<String>,
    /// Applications for which the server generated a new client secret.
    pub new_secret_applications: Vec<String>,
}

/// Totals and per type counters of one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Operations attempted.
    pub total_requests: usize,
    /// Operations that succeeded.
    pub successful: usize,
    /// Operations that failed.
    pub failed: usize,
    resources: BTreeMap<ResourceType, ResourceSummary>,
}

#[derive(Debug, Tabled)]
struct ExportRow {
    #[tabled(rename = "Resource Type")]
    resource_type: String,
    #[tabled(rename = "Exported")]
    exported: usize,
    #[tabled(rename = "Deleted")]
    deleted: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
}

#[derive(Debug, Tabled)]
struct ImportRow {
    #[tabled(rename = "Resource Type")]
    resource_type: String,
    #[tabled(rename = "Imported")]
    imported: usize,
    #[tabled(rename = "Updated")]
    updated: usize,
    #[tabled(rename = "Deleted")]
    deleted: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
}

impl Summary {
    /// Counters of one resource type.
    #[must_use]
    pub fn resource(&self, resource_type: ResourceType) -> ResourceSummary {
        self.resources
            .get(&resource_type)
            .cloned()
            .unwrap_or_default()
    }

    fn entry(&mut self, resource_type: ResourceType) -> &mut ResourceSummary {
        self.resources.entry(resource_type).or_default()
    }

    fn succeeded(&mut self, resource_type: ResourceType) -> &mut ResourceSummary {
        self.total_requests += 1;
        self.successful += 1;
        self.entry(resource_type)
    }

    /// Records a resource written to a local file.
    pub fn record_export(&mut self, resource_type: ResourceType) {
        self.succeeded(resource_type).exported += 1;
    }

    /// Records a resource created on the server.
    pub fn record_import(&mut self, resource_type: ResourceType) {
        self.succeeded(resource_type).imported += 1;
    }

    /// Records a resource updated on the server.
    pub fn record_update(&mut self, resource_type: ResourceType) {
        self.succeeded(resource_type).updated += 1;
    }

    /// Records a deleted resource.
    pub fn record_delete(&mut self, resource_type: ResourceType) {
        self.succeeded(resource_type).deleted += 1;
    }

    /// Records a failed operation on a resource.
    pub fn record_failure(&mut self, resource_type: ResourceType, name: &str) {
        self.total_requests += 1;
        self.failed += 1;
        self.entry(resource_type).failed.push(name.to_string());
    }

    /// Records an application whose import generated a new client secret.
    pub fn record_new_secret(&mut self, application: &str) {
        self.entry(ResourceType::Applications)
            .new_secret_applications
            .push(application.to_string());
    }

    /// Prints the export summary.
    pub fn print_export(&self) {
        let rows: Vec<ExportRow> = self
            .resources
            .iter()
            .map(|(resource_type, s)| ExportRow {
                resource_type: resource_type.to_string(),
                exported: s.exported,
                deleted: s.deleted,
                failed: s.failed.len(),
            })
            .collect();
        self.print(&rows);
    }

    /// Prints the import summary.
    pub fn print_import(&self) {
        let rows: Vec<ImportRow> = self
            .resources
            .iter()
            .map(|(resource_type, s)| ImportRow {
                resource_type: resource_type.to_string(),
                imported: s.imported,
                updated: s.updated,
                deleted: s.deleted,
                failed: s.failed.len(),
            })
            .collect();
        self.print(&rows);

        let apps = &self.resource(ResourceType::Applications).new_secret_applications;
        if !apps.is_empty() {
            warning(&format!(
                "New client secrets generated for: {}",
                apps.join(", ")
            ));
        }
    }

    fn print<T: Tabled>(&self, rows: &[T]) {
        println!();
        println!(
            "Total requests: {}  Successful: {}  Failed: {}",
            self.total_requests, self.successful, self.failed
        );
        output::table(rows);
        for (resource_type, s) in &self.resources {
            if !s.failed.is_empty() {
                warning(&format!("Failed {resource_type}: {}", s.failed.join(", ")));
            }
        }
    }
}
