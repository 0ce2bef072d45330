use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, CanteenClient};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Command;

/// Scripting front end for the canteen backend.
#[derive(Parser, Debug)]
#[command(name = "canteen", version)]
struct Args {
    /// Backend base URL; overrides the config file and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Path to a TOML settings file (defaults to ./canteen.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    let client = CanteenClient::from_settings(&settings)
        .with_context(|| format!("invalid backend address {:?}", settings.api_base_url))?;
    tracing::debug!(api = client.base_url(), "using backend");

    let output = commands::run(&client, args.command, args.json).await?;
    println!("{output}");
    Ok(())
}
