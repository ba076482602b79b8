//! Route table for the manager.
//!
//! Path parameters use the brace syntax: `{name}`.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/servers",
            get(handlers::servers::list).post(handlers::servers::add),
        )
        .route(
            "/servers/{name}",
            get(handlers::servers::get)
                .put(handlers::servers::update)
                .delete(handlers::servers::remove),
        )
        .route("/servers/{name}/status", get(handlers::servers::status))
        .route("/servers/{name}/enable", post(handlers::servers::enable))
        .route("/servers/{name}/disable", post(handlers::servers::disable))
        .route(
            "/backups",
            get(handlers::backups::list).post(handlers::backups::create),
        )
        .route(
            "/backups/{name}/restore",
            post(handlers::backups::restore),
        )
}

/// Build the full router: `/health` plus the `/api` routes with CORS, all
/// wrapped in request tracing.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}
