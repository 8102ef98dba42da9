//! ec-sheets (Sheet Store) - Persists and exports eight-count sheets
//!
//! Zero-config startup: the root folder and database are created on first
//! run, and every setting has a default.

use anyhow::Result;
use clap::Parser;
use ec_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use ec_sheets::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments; each falls back to config file then default
#[derive(Debug, Parser)]
#[command(name = "ec-sheets", version, about = "Eight-count sheet store")]
struct Args {
    /// Folder holding eightcount.db
    #[arg(long, env = "EC_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Config file (defaults to the platform config location)
    #[arg(long, env = "EC_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_source) = TomlConfig::load_with_source(args.config.as_deref());

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();
    config_source.log();

    info!(
        "Starting eight-count Sheet Store (ec-sheets) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut resolver = RootFolderResolver::new("sheets").with_cli_override(args.root_folder);
    if let Some(path) = &args.config {
        resolver = resolver.with_config_file(path);
    }
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match ec_common::db::init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool);
    let app = build_router(state);

    let host = args.host.unwrap_or(config.sheets.host);
    let port = args.port.unwrap_or(config.sheets.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("ec-sheets listening on http://{}:{}", host, port);
    info!("Health check: http://{}:{}/health", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}
