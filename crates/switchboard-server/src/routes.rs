// ABOUTME: Route definitions for the switchboard HTTP API.
// ABOUTME: Assembles health, agent listing, and orchestration routes into one traced Axum Router.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/agents", get(api::agents::list_agents))
        .route("/api/orchestrate", post(api::orchestrate::orchestrate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
