//! admx-rp library - Report module
//!
//! The reporting/reconciliation backend of the ADMX campaign dashboard:
//! merges the synced catalog and insight feeds into the three-level report
//! rows the frontend renders, and runs the optimistic status-toggle
//! protocol against the advertising platform.

use std::sync::Arc;

use admx_common::config::ServiceConfig;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod engine;
pub mod platform;
pub mod store;
pub mod sync;
pub mod toggle;

use platform::PlatformApi;
use store::{CatalogStore, InsightStore, OverrideStore};

/// Application state shared across HTTP handlers and background tasks
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogStore,
    pub insights: InsightStore,
    pub overrides: OverrideStore,
    pub platform: Arc<dyn PlatformApi>,
    /// Snapshot cache for warm restarts
    pub db: SqlitePool,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Create new application state with empty stores
    pub fn new(platform: Arc<dyn PlatformApi>, db: SqlitePool, config: ServiceConfig) -> Self {
        Self {
            catalog: CatalogStore::new(),
            insights: InsightStore::new(),
            overrides: OverrideStore::new(),
            platform,
            db,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/report", get(api::report::get_report))
        .route("/api/status/toggle", post(api::status::toggle_entity_status))
        .route("/api/account/switch", post(api::account::switch_account))
        .route("/api/buildinfo", get(api::buildinfo::get_build_info))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
