//! hunter: command-line front end for the Hunter Protocol
//!
//! Drives the same operations a dashboard would: quests, daily missions,
//! rewards, avatar and title changes, all persisted to a local JSON store and
//! optionally mirrored to a cloud `players` table.

mod cli;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hunter_core::LocalStore;
use hunter_sync::SyncReconciler;
use tracing::{debug, info};

use cli::{execute_command, App, Commands};
use config::Config;

#[derive(Parser)]
#[command(name = "hunter")]
#[command(about = "Level up your life, one quest at a time")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hunter.toml")]
    config: PathBuf,

    /// Data directory (overrides config file)
    #[arg(short, long, env = "HUNTER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Cloud sync base URL (overrides config file)
    #[arg(long, env = "HUNTER_SYNC_URL")]
    sync_url: Option<String>,

    /// Cloud sync API key (overrides config file)
    #[arg(long, env = "HUNTER_SYNC_KEY", hide_env_values = true)]
    sync_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load or create default config
    let mut config = Config::load(&cli.config)?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Apply CLI overrides
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    if let Some(url) = cli.sync_url {
        config.sync.url = Some(url);
    }
    if let Some(key) = cli.sync_key {
        config.sync.api_key = Some(key);
    }

    debug!(
        config = %cli.config.display(),
        data_dir = %config.storage.data_dir.display(),
        "Starting hunter"
    );

    let store = LocalStore::open(&config.storage.data_dir)
        .with_context(|| format!("opening store at {}", config.storage.data_dir.display()))?;
    let device_id = store.device_id()?;
    let sync = SyncReconciler::from_config(&config.sync, device_id)?;
    if sync.is_configured() {
        info!(device_id = %sync.device_id(), "Cloud sync enabled");
    }

    let mut app = App::new(store, sync);
    let result = execute_command(&mut app, cli.command).await;
    app.shutdown().await;

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
