//! # Command Line Interface
//!
//! Single-command entry point: resolve configuration, run the smoke test
//! against the target service, and print the report.

pub mod config;
pub mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use crate::client::{ClientConfig, SmokeClient};
use crate::runner::SmokeTestRunner;
use config::{CliConfig, CredentialFlags};
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "smokecheck")]
#[command(about = "Smoke-test the Google Sheets integration of a running backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Base URL of the service under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Token sent as `keycloak_token` in the login request
    #[arg(long)]
    pub keycloak_token: Option<String>,

    /// Email of the test user
    #[arg(long)]
    pub email: Option<String>,

    /// Display name of the test user
    #[arg(long)]
    pub name: Option<String>,

    /// Stable subject identifier (UUID) of the test user
    #[arg(long)]
    pub sub: Option<Uuid>,

    /// Path to config file (defaults to ~/.smokecheck/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format (text, json, or yaml)
    #[arg(short, long, default_value = "text")]
    pub output: String,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the CLI. Returns whether every step passed.
pub async fn run_cli() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    initialise_logging(cli.verbose)?;

    let format: OutputFormat = cli.output.parse()?;

    let file_config = match &cli.config {
        Some(path) => CliConfig::load_from_path(path)?,
        None => CliConfig::load()?,
    };

    let base_url = config::resolve_base_url(cli.base_url, &file_config);
    debug!(%base_url, "Resolved target");
    let timeout = config::resolve_timeout(cli.timeout, &file_config)?;
    let credentials = config::resolve_credentials(
        CredentialFlags {
            keycloak_token: cli.keycloak_token,
            email: cli.email,
            name: cli.name,
            sub: cli.sub,
        },
        &file_config,
    )?;

    let client = SmokeClient::new(ClientConfig { base_url, timeout })
        .context("Failed to build HTTP client")?;

    let mut runner = SmokeTestRunner::new(client, credentials);
    let outcome = runner.run().await;

    output::print_outcome(&outcome, format, !cli.no_color)?;

    Ok(outcome.passed())
}

fn initialise_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .is_err()
    {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
    Ok(())
}
