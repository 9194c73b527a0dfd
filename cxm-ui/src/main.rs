//! CaixaMaster UI service (cxm-ui) - Main entry point
//!
//! Serves the checklist session API, the reconciled submission history, the
//! dashboard aggregates, and the live SSE feed.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use cxm_ui::insights::InsightsClient;
use cxm_ui::{build_router, db, spawn_feed_merge, AppState};
use tokio::signal;
use tracing::info;

/// Command-line arguments for cxm-ui
#[derive(Parser, Debug)]
#[command(name = "cxm-ui")]
#[command(about = "Checklist and dashboard service for CaixaMaster")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "CXM_UI_PORT")]
    port: u16,

    /// Root folder holding the database (falls back to CXM_ROOT_FOLDER,
    /// then the config file, then the OS data directory)
    #[arg(short, long)]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting CaixaMaster UI (cxm-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = cxm_common::config::resolve_root_folder(args.root_folder.as_deref())
        .context("Failed to resolve root folder")?;
    let db_path = cxm_common::config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool, InsightsClient::from_env());

    let hydrated = state
        .hydrate_log()
        .await
        .context("Failed to hydrate submission log")?;
    info!("Submission log hydrated with {} records", hydrated);

    // Second mutation path of the log: feed notifications
    spawn_feed_merge(state.clone());

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("cxm-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
