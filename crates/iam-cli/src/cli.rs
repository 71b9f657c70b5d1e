//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use iam_core::ExportFormat;

/// iamctl - Move identity server configuration between environments.
#[derive(Debug, Parser)]
#[command(name = "iamctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Migration config directory (`<base>/configs/<env>`). Without it,
    /// server settings are read from environment variables.
    #[arg(short, long, env = "IAMCTL_CONFIG_DIR", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export all resources of the server into local files.
    ExportAll(ExportArgs),
    /// Import all local resource files into the server.
    ImportAll(ImportArgs),
    /// Create a template config directory.
    Setup(SetupArgs),
}

/// Arguments of `export-all`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory to write resource files to (defaults to the base directory).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File format: yaml, json or xml.
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<ExportFormat>,
}

/// Arguments of `import-all`.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Directory to read resource files from (defaults to the base directory).
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Arguments of `setup`.
#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Base directory (defaults to the current directory).
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_extension(value)
        .ok_or_else(|| format!("unsupported format '{value}', expected yaml, json or xml"))
}
