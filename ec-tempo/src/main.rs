//! ec-tempo (Tempo Lookup) - Proxy to the streaming-music API
//!
//! Stateless: holds no database, only an HTTP client for the upstream API.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ec_common::config::TomlConfig;
use ec_tempo::{build_router, AppState, MusicApiClient};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments; each falls back to config file then default
#[derive(Debug, Parser)]
#[command(name = "ec-tempo", version, about = "Eight-count tempo lookup proxy")]
struct Args {
    /// Config file (defaults to the platform config location)
    #[arg(long, env = "EC_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(long)]
    port: Option<u16>,

    /// Base URL of the music API (e.g. https://api.spotify.com/v1)
    #[arg(long, env = "EC_UPSTREAM_URL")]
    upstream_url: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
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
        "Starting eight-count Tempo Lookup (ec-tempo) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let upstream_url = args.upstream_url.unwrap_or(config.tempo.upstream_base_url);
    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(config.tempo.timeout_secs));
    let client = MusicApiClient::new(&upstream_url, timeout)
        .with_context(|| format!("Failed to create music API client for {}", upstream_url))?;
    info!("Upstream music API: {} (timeout {:?})", client.base_url(), timeout);

    let app = build_router(AppState::new(client));

    let host = args.host.unwrap_or(config.tempo.host);
    let port = args.port.unwrap_or(config.tempo.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("ec-tempo listening on http://{}:{}", host, port);
    info!("Health check: http://{}:{}/health", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}
