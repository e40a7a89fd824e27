//! Status toggle API

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use admx_common::model::EntityLevel;
use admx_common::Error;

use crate::toggle::toggle_status;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub entity_id: String,
    /// "campaign" | "adset" | "ad"
    pub level: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub entity_id: String,
    pub effective_status: String,
    pub status_label: String,
    /// Present when the confirmed platform state disagrees with the
    /// requested one; the override stays until the user acts on it
    pub warning: Option<String>,
}

/// POST /api/status/toggle
///
/// Runs the optimistic toggle protocol and returns the effective status
/// once the confirmation re-fetch has landed.
pub async fn toggle_entity_status(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ToggleError> {
    let level = EntityLevel::parse(&request.level)
        .ok_or_else(|| ToggleError::BadRequest(format!("Invalid level: {}", request.level)))?;

    let outcome = toggle_status(&state, &request.entity_id, level)
        .await
        .map_err(ToggleError::from)?;

    Ok(Json(ToggleResponse {
        entity_id: request.entity_id,
        effective_status: outcome.effective_status.as_str().to_string(),
        status_label: outcome.status_label,
        warning: outcome.warning,
    }))
}

/// Toggle API errors
#[derive(Debug)]
pub enum ToggleError {
    BadRequest(String),
    NotFound(String),
    /// Platform refused the change; carries the platform's reason
    Rejected(String),
    RateLimited,
    Internal(String),
}

impl From<Error> for ToggleError {
    fn from(err: Error) -> Self {
        match err {
            Error::StatusUpdateRejected { reason } => ToggleError::Rejected(reason),
            Error::StatusUpdateRateLimited => ToggleError::RateLimited,
            Error::InvalidInput(msg) => ToggleError::BadRequest(msg),
            Error::NotFound(msg) => ToggleError::NotFound(msg),
            other => ToggleError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ToggleError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ToggleError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ToggleError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ToggleError::Rejected(reason) => (
                StatusCode::CONFLICT,
                format!("Status update rejected: {}", reason),
            ),
            ToggleError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Status update rate limited; wait before retrying".to_string(),
            ),
            ToggleError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
