//! Optimistic status toggle protocol
//!
//! A toggle writes its intent into the override store first, so the very
//! next render shows the new state, then asks the platform to apply it.
//! After a short delay the affected catalog level is re-fetched and the
//! confirmed state compared against the intent:
//!
//! - agreement clears the override (reconciliation complete);
//! - disagreement keeps the override and returns a warning; the caller
//!   decides what to do, the engine never silently drops the intent;
//! - a refused or rate-limited update rolls the override back and kicks
//!   off a full ground-truth refresh.
//!
//! A newer toggle on the same entity supersedes a pending one: the
//! deferred confirmation only clears the exact override entry it wrote.

use admx_common::model::{EffectiveStatus, EntityLevel};
use admx_common::{Error, Result};
use tracing::{info, warn};

use crate::engine::status::resolve_status;
use crate::{db, sync, AppState};

/// Result of a confirmed toggle
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    pub effective_status: EffectiveStatus,
    pub status_label: String,
    /// Set when the platform's confirmed state disagrees with the intent
    /// (e.g. a parent is still paused)
    pub warning: Option<String>,
}

/// Toggle an entity between running and paused
pub async fn toggle_status(
    state: &AppState,
    entity_id: &str,
    level: EntityLevel,
) -> Result<ToggleOutcome> {
    let view = state.catalog.view().await;
    let overrides = state.overrides.snapshot().await;
    let current = resolve_status(&view, &overrides, level, entity_id);

    match current {
        EffectiveStatus::Deleted | EffectiveStatus::Archived => {
            return Err(Error::InvalidInput(format!(
                "entity {} is {} and cannot be toggled",
                entity_id,
                current.as_str()
            )));
        }
        EffectiveStatus::Unknown if view.get(level, entity_id).is_none() => {
            return Err(Error::NotFound(format!("entity {} not in catalog", entity_id)));
        }
        _ => {}
    }

    let intended_active = !current.is_running();
    let entry = state.overrides.set(entity_id, intended_active).await;
    info!(
        entity = entity_id,
        level = %level,
        intended_active,
        "Optimistic status override written"
    );

    if let Err(err) = state
        .platform
        .update_status(entity_id, level, intended_active)
        .await
    {
        // Roll back the optimistic state and reload ground truth so the
        // UI never keeps a dangling override.
        state.overrides.remove(entity_id).await;
        let refresh_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = sync::refresh_all(&refresh_state).await {
                warn!("Post-failure refresh failed: {}", e);
            }
        });
        return Err(err);
    }

    // Deferred confirmation: give the platform a moment to propagate the
    // change, then re-fetch the affected level.
    tokio::time::sleep(std::time::Duration::from_millis(
        state.config.toggle_confirm_delay_ms,
    ))
    .await;

    match state.platform.fetch_catalog(level).await {
        Ok(entities) => {
            if let Err(e) = db::save_catalog_level(&state.db, level, &entities).await {
                warn!(level = %level, "Catalog snapshot write failed: {}", e);
            }
            state.catalog.replace_level(level, entities, true).await;
        }
        Err(e) => warn!(level = %level, "Confirmation re-fetch failed: {}", e),
    }

    // Compare platform truth (without our own override) against the intent
    let view = state.catalog.view().await;
    let mut ground = state.overrides.snapshot().await;
    ground.remove(entity_id);
    let confirmed = resolve_status(&view, &ground, level, entity_id);

    if confirmed.is_running() == intended_active {
        state.overrides.remove_if_matches(entity_id, entry).await;
        info!(entity = entity_id, status = %confirmed, "Toggle confirmed");
        Ok(ToggleOutcome {
            effective_status: confirmed,
            status_label: confirmed.display_vi().to_string(),
            warning: None,
        })
    } else {
        // Keep the override; surface the disagreement instead of silently
        // overwriting the user's intent.
        let warning = format!(
            "Platform reports {} after the change; the requested state has not taken effect",
            confirmed.as_str()
        );
        warn!(entity = entity_id, confirmed = %confirmed, "Toggle confirmation mismatch");
        let all = state.overrides.snapshot().await;
        let optimistic = resolve_status(&view, &all, level, entity_id);
        Ok(ToggleOutcome {
            effective_status: optimistic,
            status_label: optimistic.display_vi().to_string(),
            warning: Some(warning),
        })
    }
}
