mod app;
mod config;
mod map;
mod ui;

use clap::Parser;
use eframe::egui;
use log::{error, info, warn};

use app::WmsExplorerApp;
use config::AppConfig;

/// Browse WMS layers and pick values for their dimensions
#[derive(Parser, Debug)]
#[command(name = "wms-explorer", version, about)]
struct Cli {
    /// Feature catalog WMS endpoint, overriding the configured one
    #[arg(long)]
    fc_url: Option<String>,

    /// Catalog layer to show on startup instead of the default layer
    #[arg(long)]
    layer: Option<String>,

    /// Print the configuration file path and exit
    #[arg(long)]
    config_path: bool,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.config_path {
        match AppConfig::get_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => error!("Cannot determine configuration path: {}", e),
        }
        return Ok(());
    }

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });
    if let Some(url) = cli.fc_url {
        config.catalog_url = url;
    }

    info!("Starting WMS Explorer...");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("WMS Explorer"),
        ..Default::default()
    };

    let initial_layer = cli.layer;
    eframe::run_native(
        "WMS Explorer",
        options,
        Box::new(move |cc| {
            WmsExplorerApp::new(cc, config, initial_layer)
                .map(|app| Box::new(app) as Box<dyn eframe::App>)
        }),
    )
}
