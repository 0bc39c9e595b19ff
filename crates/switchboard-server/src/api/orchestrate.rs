// ABOUTME: Orchestration handler: runs one user query and wraps the outcome in the response envelope.
// ABOUTME: Failures report the stage that failed and whatever per-agent results were gathered.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use crate::app_state::SharedState;

/// Request body for an orchestration run.
#[derive(Debug, Deserialize)]
pub struct OrchestrateRequest {
    pub query: String,
}

/// POST /api/orchestrate - Plan, dispatch, and synthesize an answer to `query`.
pub async fn orchestrate(
    State(state): State<SharedState>,
    Json(req): Json<OrchestrateRequest>,
) -> impl IntoResponse {
    let query = req.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "query must not be empty" })),
        )
            .into_response();
    }

    match state.ask(query).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "response": result.final_answer,
                "details": {
                    "plan": result.plan,
                    "results": result.results,
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(stage = %e.stage(), error = %e, "orchestration request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "stage": e.stage(),
                    "plan": e.plan(),
                    "partial_results": e.partial_results(),
                })),
            )
                .into_response()
        }
    }
}
