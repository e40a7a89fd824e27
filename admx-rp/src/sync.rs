//! Background catalog/insight synchronization
//!
//! A periodic task refreshes the account health probe, all three catalog
//! levels, and the insight window, then persists the result as the warm-
//! start snapshot. Each level is fetched and applied independently: one
//! failing level logs and leaves the previous data (and its loaded flag)
//! untouched while the others land. The reporting engine never blocks on
//! a sync; it renders whatever the stores currently hold.

use std::time::Duration;

use admx_common::model::EntityLevel;
use admx_common::{DateRange, Result};
use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{db, AppState};

const LEVELS: [EntityLevel; 3] = [EntityLevel::Campaign, EntityLevel::AdSet, EntityLevel::Ad];

/// The insight window ending today, sized from configuration
fn insight_window(window_days: u32) -> DateRange {
    let until = Utc::now().date_naive();
    let since = until - chrono::Duration::days(window_days.max(1) as i64 - 1);
    DateRange { since, until }
}

/// One full refresh: account probe, catalog levels, insight window,
/// snapshot persistence. Invoked by the periodic loop, after an account
/// switch, and as the ground-truth reload after a failed toggle.
pub async fn refresh_all(state: &AppState) -> Result<()> {
    let run_id = Uuid::new_v4();
    info!(%run_id, "Sync run starting");

    match state.platform.account_status().await {
        Ok(health) => state.catalog.set_account_health(health).await,
        Err(e) => warn!(%run_id, "Account status probe failed: {}", e),
    }

    // Catalog: all levels concurrently, each applied independently
    let results = join_all(
        LEVELS
            .iter()
            .map(|level| state.platform.fetch_catalog(*level)),
    )
    .await;
    for (level, result) in LEVELS.iter().zip(results) {
        match result {
            Ok(entities) => {
                info!(%run_id, level = %level, count = entities.len(), "Catalog level synced");
                if let Err(e) = db::save_catalog_level(&state.db, *level, &entities).await {
                    warn!(%run_id, level = %level, "Catalog snapshot write failed: {}", e);
                }
                state.catalog.replace_level(*level, entities, true).await;
            }
            Err(e) => {
                // Keep the previous level data; the engine tolerates a
                // partially refreshed catalog.
                warn!(%run_id, level = %level, "Catalog fetch failed: {}", e);
            }
        }
    }

    // Insights: the configured trailing window per level
    let range = insight_window(state.config.insight_window_days);
    let results = join_all(
        LEVELS
            .iter()
            .map(|level| state.platform.fetch_insights(*level, &range)),
    )
    .await;

    let mut fetched = Vec::new();
    let mut all_levels_ok = true;
    for (level, result) in LEVELS.iter().zip(results) {
        match result {
            Ok(records) => {
                info!(%run_id, level = %level, count = records.len(), "Insights fetched");
                fetched.extend(records);
            }
            Err(e) => {
                all_levels_ok = false;
                warn!(%run_id, level = %level, "Insight fetch failed: {}", e);
            }
        }
    }

    if all_levels_ok {
        // Complete window: replace the feed wholesale
        state.insights.replace_all(fetched).await;
    } else if !fetched.is_empty() {
        // Partial window: append; the aggregation dedup absorbs overlap
        state.insights.extend(fetched).await;
    }

    let snapshot = state.insights.snapshot().await;
    if let Err(e) = db::replace_insights(&state.db, &snapshot).await {
        warn!(%run_id, "Insight snapshot write failed: {}", e);
    }

    info!(%run_id, records = snapshot.len(), "Sync run finished");
    Ok(())
}

/// Restore stores from the on-disk snapshot at startup. Loaded flags stay
/// unset: snapshot data renders, but child-dependent status rules wait
/// for live data.
pub async fn restore_snapshot(state: &AppState) {
    match db::load_catalog(&state.db).await {
        Ok(entities) => {
            let mut by_level: std::collections::HashMap<EntityLevel, Vec<_>> =
                std::collections::HashMap::new();
            for entity in entities {
                by_level.entry(entity.level).or_default().push(entity);
            }
            for (level, group) in by_level {
                state.catalog.replace_level(level, group, false).await;
            }
        }
        Err(e) => warn!("Catalog snapshot restore failed: {}", e),
    }

    match db::load_insights(&state.db).await {
        Ok(records) => {
            info!(count = records.len(), "Restored insight snapshot");
            state.insights.replace_all(records).await;
        }
        Err(e) => warn!("Insight snapshot restore failed: {}", e),
    }
}

/// Spawn the periodic sync loop (first run immediate)
pub fn spawn_sync(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(state.config.sync_interval_secs.max(30));
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = refresh_all(&state).await {
                error!("Sync run failed: {}", e);
            }
        }
    })
}
