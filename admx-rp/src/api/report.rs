//! Report API: the composed multi-level performance view

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use admx_common::model::{EffectiveStatus, EntityLevel, ReportRow};
use admx_common::DateRange;

use crate::engine::{compose, SortField, SortSpec, ViewRequest};
use crate::AppState;

/// Query parameters for the report view
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Hierarchy level: "campaign" | "adset" | "ad"
    pub level: String,
    /// Restrict to children of this entity id
    pub parent: Option<String>,
    /// Window start, "YYYY-MM-DD"
    pub since: String,
    /// Window end, "YYYY-MM-DD"
    pub until: String,
    /// Comma-separated status allow-list; unset applies the default filter
    pub statuses: Option<String>,
    /// Sort column; unset applies the status-tier ordering
    pub sort: Option<String>,
    /// Sort order: "asc" or "desc"
    #[serde(default = "default_order")]
    pub order: String,
}

fn default_order() -> String {
    "asc".to_string()
}

/// Report response
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub level: String,
    pub since: String,
    pub until: String,
    pub row_count: usize,
    pub rows: Vec<ReportRow>,
}

/// GET /api/report
///
/// Runs the full reconciliation pass for one level and window: aggregated
/// real rows plus synthetic zero rows, status-filtered and ordered.
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ReportError> {
    let level = EntityLevel::parse(&query.level)
        .ok_or_else(|| ReportError::InvalidLevel(query.level.clone()))?;

    let range = DateRange::parse(&query.since, &query.until)
        .map_err(|e| ReportError::InvalidRange(e.to_string()))?;

    let statuses = match &query.statuses {
        None => None,
        Some(raw) => {
            let mut allowed = Vec::new();
            for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let status = EffectiveStatus::parse(token)
                    .ok_or_else(|| ReportError::InvalidStatus(token.to_string()))?;
                allowed.push(status);
            }
            Some(allowed)
        }
    };

    let sort = match &query.sort {
        None => None,
        Some(raw) => Some(SortSpec {
            field: SortField::parse(raw)
                .ok_or_else(|| ReportError::InvalidSort(raw.clone()))?,
            descending: query.order.eq_ignore_ascii_case("desc"),
        }),
    };

    let request = ViewRequest {
        level,
        parent_id: query.parent.clone(),
        range,
        statuses,
        sort,
    };

    // Fetch the three store snapshots concurrently; composition itself is
    // synchronous over the consistent snapshots.
    let (view, overrides, insights) = tokio::join!(
        state.catalog.view(),
        state.overrides.snapshot(),
        state.insights.snapshot(),
    );
    let rows = compose(&view, &overrides, &insights, &state.config.currency, &request);

    Ok(Json(ReportResponse {
        level: level.as_str().to_string(),
        since: range.since.to_string(),
        until: range.until.to_string(),
        row_count: rows.len(),
        rows,
    }))
}

/// Report API errors
#[derive(Debug)]
pub enum ReportError {
    InvalidLevel(String),
    InvalidRange(String),
    InvalidStatus(String),
    InvalidSort(String),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ReportError::InvalidLevel(level) => {
                (StatusCode::BAD_REQUEST, format!("Invalid level: {}", level))
            }
            ReportError::InvalidRange(msg) => (StatusCode::BAD_REQUEST, msg),
            ReportError::InvalidStatus(token) => {
                (StatusCode::BAD_REQUEST, format!("Invalid status: {}", token))
            }
            ReportError::InvalidSort(field) => {
                (StatusCode::BAD_REQUEST, format!("Invalid sort field: {}", field))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
