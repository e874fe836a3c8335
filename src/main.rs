mod cli;
mod collab;
mod config;
mod finders;
mod planner;
mod trip;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let builder = Config::resolve().context("Failed to load configuration")?;
    let config = cli
        .apply_overrides(builder)
        .build()
        .context("Failed to build configuration")?;

    cli.run(config).await
}
