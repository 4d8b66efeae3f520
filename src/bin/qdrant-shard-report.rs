use anyhow::Result;
use clap::Parser;
use std::process::exit;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shard_report_lib::cli::{handle_command, normalize_legacy_flags, CliArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Setup Tracing ---
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- Parse Args ---
    let args = CliArgs::parse_from(normalize_legacy_flags(std::env::args()));

    // --- Execute Command ---
    tracing::debug!("Parsed arguments for {}:{}", args.host, args.port);

    if let Err(e) = handle_command(args).await {
        tracing::error!("Report failed: {:#}", e);
        exit(1);
    }

    Ok(())
}
