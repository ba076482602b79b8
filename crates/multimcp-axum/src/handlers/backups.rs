//! Backup snapshot handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use crate::dto::{ApiResponse, RestoreSummary};
use crate::error::HttpError;
use crate::state::AppState;

/// Snapshot file names, oldest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<String>>>, HttpError> {
    Ok(Json(ApiResponse::ok(state.backups.list().await?)))
}

/// Write a snapshot of the current registry and return its name.
pub async fn create(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), HttpError> {
    let name = state.backups.create().await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(name))))
}

pub async fn restore(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<RestoreSummary>>, HttpError> {
    let restored = state.backups.restore(&name).await?;
    info!(backup = %name, restored, "Restore requested over HTTP completed");
    Ok(Json(ApiResponse::ok(RestoreSummary { name, restored })))
}
