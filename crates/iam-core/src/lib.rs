//! # iam-core
//!
//! Shared foundation for the iamctl workspace.
//!
//! This crate provides:
//! - Resource types and the file formats they are exported in
//! - Server, tool and keyword configuration loading
//! - Constants shared by the keyword engine and the CLI

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod resource;

pub use config::{
    KeywordConfig, MigrationConfig, ResourceTypeConfig, ServerConfig, ToolConfig,
};
pub use error::{Error, Result};
pub use resource::{ExportFormat, ResourceType, MASKED_SECRET, RESIDENT_IDP_NAME};
