//! domod - Device Inventory Daemon
//!
//! REST API server for the home device inventory (homes, levels, rooms,
//! devices and the reference catalogs), with derived naming fields
//! computed on every read.
//!
//! Usage:
//!   domod [OPTIONS] [config.toml]
//!
//! If no config file is provided, the daemon listens on the default port
//! and keeps the inventory in memory only.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use domo_api::{create_router, AppState};
use domo_store::Inventory;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::Config;

/// Parsed command-line arguments
struct Args {
    /// Server config file (TOML)
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args { config_path: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"domod - Device Inventory Daemon

Usage: domod [OPTIONS] [config.toml]

Options:
  -h, --help    Print this help message

Examples:
  # Run in memory on the default port
  domod

  # Run with a config file (port + snapshot persistence)
  domod config.toml
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domod=info,domo_api=info,domo_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting domod (Device Inventory Daemon)");

    let args = parse_args();

    let config = if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path);
        Config::from_file(Path::new(path))?
    } else {
        tracing::info!("No config file provided, running in memory");
        Config::default()
    };

    let inventory = match &config.server.data_file {
        Some(path) if path.exists() => {
            let inventory = Inventory::load_from_file(path)?;
            let stats = inventory.stats();
            tracing::info!(
                path = %path.display(),
                devices = stats.get("devices").copied().unwrap_or(0),
                "Loaded inventory snapshot"
            );
            inventory
        }
        Some(path) => {
            tracing::info!(path = %path.display(), "Snapshot not found, starting empty");
            Inventory::new()
        }
        None => Inventory::new(),
    };

    let inventory = Arc::new(inventory);
    let state = match config.server.data_file.clone() {
        Some(path) => AppState::with_snapshot(inventory, path),
        None => AppState::new(inventory),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
