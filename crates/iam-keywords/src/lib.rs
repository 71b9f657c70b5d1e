//! # iam-keywords
//!
//! Keyword placeholder engine for exported identity server resources.
//!
//! Local resource files may carry `{{NAME}}` placeholders in place of
//! environment specific values. This crate provides:
//! - A structured document model with identifier based paths
//! - Scanning of placeholder locations
//! - Placeholder substitution for imports
//! - Reconciliation of fresh exports with local templates
//!
//! Everything here is pure; callers supply the bytes and write the result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod mapping;
pub mod path;
pub mod reconcile;
pub mod scanner;
pub mod substitute;

mod tags;

pub use document::{Document, Scalar};
pub use error::{KeywordError, KeywordResult};
pub use mapping::{IdentifierTable, KeywordMapping};
pub use path::{locate_array_element, resolve_path_segment, Path, PathSegment};
pub use reconcile::{
    process_exported_content, process_exported_document, reconcile, Divergence,
    ReconcileReport, Reconciliation,
};
pub use scanner::find_keyword_locations;
pub use substitute::{
    contains_any_keyword, referenced_keywords, substitute, substitute_stripping_unknown,
};
