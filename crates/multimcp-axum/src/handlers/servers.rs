//! Server registry handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use multimcp_core::domain::{ServerConfig, ServerStatus};

use crate::dto::{AddServerRequest, ApiResponse, UpdateServerRequest};
use crate::error::HttpError;
use crate::state::AppState;

/// List every registered server.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BTreeMap<String, ServerConfig>>>, HttpError> {
    Ok(Json(ApiResponse::ok(state.registry.list().await?)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ServerConfig>>, HttpError> {
    Ok(Json(ApiResponse::ok(state.registry.get(&name).await?)))
}

/// Register a new server. Responds 201 with the stored config.
pub async fn add(
    State(state): State<AppState>,
    body: Result<Json<AddServerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ServerConfig>>), HttpError> {
    let Json(req) = body?;
    state.registry.add(&req.name, req.config.clone()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(req.config))))
}

/// Apply a partial config and return the merged result.
pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<UpdateServerRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ServerConfig>>, HttpError> {
    let Json(req) = body?;
    let merged = state.registry.update(&name, req.config).await?;
    Ok(Json(ApiResponse::ok(merged)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<()>>, HttpError> {
    state.registry.delete(&name).await?;
    Ok(Json(ApiResponse::done()))
}

/// Status report. Unknown names read as `error`, not 404.
pub async fn status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ServerStatus>>, HttpError> {
    Ok(Json(ApiResponse::ok(state.registry.get_status(&name).await?)))
}

pub async fn enable(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ServerStatus>>, HttpError> {
    state.registry.enable(&name).await?;
    Ok(Json(ApiResponse::ok(state.registry.get_status(&name).await?)))
}

pub async fn disable(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ServerStatus>>, HttpError> {
    state.registry.disable(&name).await?;
    Ok(Json(ApiResponse::ok(state.registry.get_status(&name).await?)))
}
