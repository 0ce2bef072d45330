use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
#[cfg(test)]
mod test_support;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::{load_settings, CanteenClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::{commands::BackendCommand, runtime};
use controller::events::UiEvent;
use ui::ConsoleApp;

const APP_NAME: &str = "Canteen Console";

#[derive(Debug, Parser)]
#[command(name = "canteen-console", about = "Desktop admin console for the canteen backend")]
struct Args {
    /// Backend base URL; overrides the config file and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Path to a TOML settings file (defaults to ./canteen.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Page to open first, e.g. /stock or /deposit/42.
    #[arg(long)]
    route: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref());
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    let client = CanteenClient::from_settings(&settings)
        .with_context(|| format!("invalid backend address {:?}", settings.api_base_url))?;
    let api_base_url = client.base_url().to_string();
    tracing::info!(api = %api_base_url, "starting {APP_NAME}");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let _worker = runtime::launch(Arc::new(client), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([820.0, 560.0]),
        ..Default::default()
    };
    let start_route = args.route;
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ConsoleApp::new(
                cmd_tx,
                ui_rx,
                api_base_url,
                start_route.as_deref(),
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop window failed: {err}"))
}
