use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::formatters::{render_json, render_table};
use crate::config::{ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};
use crate::qdrant_client_trait::{connect, QdrantClientTrait};
use crate::report::{Report, ReportGenerator, DEFAULT_RUN_TIMEOUT, MAX_RUN_TIMEOUT};

/// Flags that may also be written with a single leading dash (`-host localhost`).
const LEGACY_FLAGS: [&str; 4] = ["host", "port", "apikey", "tls"];

/// Reports per-shard point counts for every collection in a Qdrant cluster.
#[derive(Parser, Debug, Clone)]
#[command(name = "qdrant-shard-report", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Qdrant server host
    #[arg(long, env = "QDRANT_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Qdrant gRPC port
    #[arg(long, env = "QDRANT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// API key for Qdrant (optional)
    #[arg(long, env = "QDRANT_API_KEY", default_value = "", hide_env_values = true, hide_default_value = true)]
    pub apikey: String,

    /// Connect over TLS
    #[arg(long, env = "QDRANT_TLS")]
    pub tls: bool,

    /// Total time budget in seconds shared by every request of the run
    #[arg(long, default_value_t = DEFAULT_RUN_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..=MAX_RUN_TIMEOUT.as_secs()))]
    pub timeout_secs: u64,

    /// Print the shard rows as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Connection settings described by these arguments.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.host.clone(), self.port)
            .with_api_key(self.apikey.clone())
            .with_tls(self.tls)
    }

    /// Overall deadline budget for the run.
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Rewrites single-dash long flags (`-port 6334`, `-tls=true`) into the
/// double-dash form clap understands. Anything else is passed through.
pub fn normalize_legacy_flags<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut normalized = Vec::new();
    for (index, arg) in args.into_iter().map(Into::into).enumerate() {
        // argv[0] is the program name
        if index == 0 || arg.starts_with("--") || !arg.starts_with('-') {
            normalized.push(arg);
            continue;
        }

        let body = &arg[1..];
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        if !LEGACY_FLAGS.contains(&name) {
            normalized.push(arg);
            continue;
        }

        match (name, value) {
            ("tls", Some(value)) => {
                if value.eq_ignore_ascii_case("true") || value == "1" {
                    normalized.push("--tls".to_string());
                }
            }
            (name, Some(value)) => normalized.push(format!("--{name}={value}")),
            (name, None) => normalized.push(format!("--{name}")),
        }
    }
    normalized
}

/// Generates the report with `client` and writes it to `writer`.
///
/// Nothing is written unless every fatal step succeeded.
pub async fn run_report<C, W>(args: &CliArgs, client: Arc<C>, writer: &mut W) -> Result<Report>
where
    C: QdrantClientTrait + ?Sized,
    W: Write,
{
    let generator = ReportGenerator::new(client, args.run_timeout());
    let report = generator.generate().await?;

    if args.json {
        render_json(writer, &report.shards)?;
    } else {
        render_table(writer, &report.shards)?;
    }
    writer.flush().context("Failed to flush report output")?;

    tracing::debug!("Wrote {} shard rows", report.shards.len());
    Ok(report)
}

/// Handles a full invocation: connect, generate and print to stdout.
pub async fn handle_command(args: CliArgs) -> Result<()> {
    let config = args.connection_config();
    tracing::info!("Using Qdrant at {}", config.url());
    tracing::debug!("Connection config: {:?}", config);

    let client = Arc::new(connect(&config, args.run_timeout())?);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run_report(&args, client, &mut out).await?;
    Ok(())
}
