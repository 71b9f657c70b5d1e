//! # iamctl
//!
//! Identity server configuration migration tool.

#![forbid(unsafe_code)]

use clap::Parser;
use iam_cli::{
    cli::{Cli, Command},
    commands::{run_export, run_import, run_setup},
    config::CliConfig,
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match CliConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Command::ExportAll(args) => run_export(args, &config, cli.config).await,
        Command::ImportAll(args) => run_import(args, &config, cli.config).await,
        Command::Setup(args) => run_setup(args),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
