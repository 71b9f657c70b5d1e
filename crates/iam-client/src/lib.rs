//! # iam-client
//!
//! Client for the identity server management REST API.
//!
//! [`ResourceApi`] is the seam the migration commands use; [`ApiClient`]
//! implements it over HTTP with bearer authentication.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod client;
pub mod error;
pub mod token;

pub use api::{ExportedFile, ResourceApi, ResourceRef, UploadFile};
pub use client::ApiClient;
pub use error::{status_message, ApiError, ApiResult};
pub use token::{fetch_access_token, MANAGEMENT_SCOPE};
