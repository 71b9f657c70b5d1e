//! # iam-cli
//!
//! Command-line tool that moves identity server configuration between
//! environments through versioned local files.
//!
//! `export-all` writes every application, identity provider, claim dialect
//! and user store to `<base>/<Type>/<name>.<ext>`, keeping the keyword
//! placeholders of files that already exist. `import-all` sends the files
//! back with placeholders resolved for the target environment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod resources;
pub mod summary;

pub use config::CliConfig;
pub use error::{CliError, CliResult};
