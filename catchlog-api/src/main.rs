//! catchlog-api - Trip report submission service
//!
//! Accepts multipart trip submissions, uploads pictures to the asset store,
//! and persists trips and catches in SQLite.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use catchlog_api::assets::SupabaseAssetStore;
use catchlog_api::{build_router, AppState};
use catchlog_common::config::{default_config_path, CliOverrides, ServiceConfig, TomlConfig};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "catchlog-api")]
#[command(about = "Trip report submission service")]
#[command(version)]
struct Args {
    /// HTTP server port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "CATCHLOG_BIND")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "CATCHLOG_DATABASE")]
    database: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "CATCHLOG_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let file_config = TomlConfig::load_or_default(config_path.as_deref())?;

    let level = file_config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("catchlog_api={},tower_http={}", level, level))
        }))
        .init();

    info!(
        "Starting catchlog-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match config_path.as_deref() {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => warn!("No config directory available, using defaults"),
    }

    let overrides = CliOverrides {
        bind: args.bind,
        port: args.port,
        database: args.database,
    };
    let config = ServiceConfig::resolve(&overrides, &file_config)?;

    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN not configured, trip endpoints are unauthenticated");
    }

    info!("Database: {}", config.database_path.display());
    let db_pool = catchlog_api::db::init_database_pool(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let assets = SupabaseAssetStore::new(&config.storage)
        .context("Failed to initialize asset store")?;
    info!(bucket = %config.storage.bucket, "Asset store ready");

    let state = AppState::new(
        db_pool,
        Arc::new(assets),
        config.admin_token.clone(),
        config.max_upload_bytes,
    );
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("catchlog-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
