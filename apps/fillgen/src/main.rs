//! fillgen command line entry point.

mod app;
mod cli;
mod config;
mod progress;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    let default_filter = if cli.verbose { "info,fillgen=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.list_types {
        app::list_types(cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = config::Config::load(cli.config.as_deref())?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting fillgen");

    let rt = tokio::runtime::Runtime::new()?;
    let code = rt.block_on(app::run(cli, config))?;
    Ok(ExitCode::from(code))
}
