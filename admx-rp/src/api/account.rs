//! Account switch API
//!
//! Switching accounts clears every store (catalog, insights, pending
//! overrides) and kicks off a fresh sync; the report renders empty until
//! the first sync for the new account lands.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{sync, AppState};

#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    pub account_id: String,
}

#[derive(Debug, Serialize)]
pub struct SwitchResponse {
    pub account_id: String,
    pub status: String,
}

/// POST /api/account/switch
pub async fn switch_account(
    State(state): State<AppState>,
    Json(request): Json<SwitchRequest>,
) -> impl IntoResponse {
    if request.account_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "account_id must not be empty" })),
        )
            .into_response();
    }

    info!(account = %request.account_id, "Switching account");
    state.platform.set_account(&request.account_id).await;
    state.catalog.clear().await;
    state.insights.clear().await;
    state.overrides.clear().await;

    let refresh_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = sync::refresh_all(&refresh_state).await {
            warn!("Post-switch refresh failed: {}", e);
        }
    });

    Json(SwitchResponse {
        account_id: request.account_id,
        status: "refreshing".to_string(),
    })
    .into_response()
}
