//! admx-rp (Report) - Campaign reporting & reconciliation service
//!
//! Syncs the catalog and insight feeds from the advertising platform and
//! serves the reconciled multi-level report plus the status-toggle API.

use std::sync::Arc;

use admx_common::config::{resolve_root_folder, ServiceConfig};
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use admx_rp::platform::MarketingClient;
use admx_rp::{build_router, db, sync, AppState};

#[derive(Debug, Parser)]
#[command(name = "admx-rp", about = "ADMX report module")]
struct Args {
    /// Root folder for database and configuration
    #[arg(long)]
    root_folder: Option<String>,

    /// Override the bind port from configuration
    #[arg(long)]
    port: Option<u16>,
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
        "Starting ADMX Report (admx-rp) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "ADMX_ROOT_FOLDER");
    std::fs::create_dir_all(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let mut config = ServiceConfig::load(&root_folder.join("config.toml"))?;
    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if config.account_id.is_empty() {
        warn!("No account_id configured; sync will fail until one is set");
    }

    let db_path = root_folder.join("admx.db");
    let pool = db::connect(&db_path).await?;

    let client = MarketingClient::new(
        &config.api_base_url,
        &config.account_id,
        &config.access_token,
    )?;

    let bind_addr = format!("{}:{}", config.bind_host, config.bind_port);
    let state = AppState::new(Arc::new(client), pool, config);

    // Warm-start from the last snapshot, then sync in the background
    sync::restore_snapshot(&state).await;
    let _sync_task = sync::spawn_sync(state.clone());

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("admx-rp listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
