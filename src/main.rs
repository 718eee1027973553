#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser as _;
use nftmarketd::{cli_args, config, run_nftmarketd};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "Fatal error");
            eprintln!("Fatal error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = cli_args::parse();
    let settings = config::load(&args.config).context("load configuration")?;

    info!("Starting nftmarketd");

    run_nftmarketd(&settings, &args).await
}
