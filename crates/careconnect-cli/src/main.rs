#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod handler;
mod store;
mod telemetry;

use std::process;

use anyhow::Context;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "careconnect_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "careconnect_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "careconnect_cli::command";
pub const TRACING_TARGET_STORE: &str = "careconnect_cli::store";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %format_args!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(cli.log_format).context("failed to initialize tracing")?;
    cli.log();

    handler::execute(cli).await
}
