// ABOUTME: Roster listing handler: every registered agent with its capabilities and input schemas.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use crate::app_state::SharedState;

/// GET /api/agents - List the registered agents in name order.
pub async fn list_agents(State(state): State<SharedState>) -> Json<Vec<Value>> {
    Json(
        state
            .orchestrator
            .agents()
            .iter()
            .map(|agent| agent.describe())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use crate::app_state::{AppState, SharedState};
    use crate::routes::create_router;
    use axum::body::Body;
    use http::Request;
    use std::sync::Arc;
    use switchboard_agents::default_registry;
    use switchboard_engine::{EngineConfig, Orchestrator};
    use switchboard_gateway::testing::ScriptedGateway;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        let gateway = Arc::new(ScriptedGateway::new());
        let agents = default_registry(gateway.clone()).unwrap();
        Arc::new(AppState::new(
            Orchestrator::new(gateway, agents, EngineConfig::default()),
            None,
        ))
    }

    #[tokio::test]
    async fn lists_roster_with_capabilities() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(Request::get("/api/agents").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let agents = json.as_array().unwrap();
        assert_eq!(agents.len(), 3);

        let names: Vec<&str> = agents.iter().map(|a| a["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["WeatherForecaster", "Researcher", "Solver"]);

        let solver_caps: Vec<&str> = agents[2]["capabilities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(solver_caps.contains(&"calculate"));
        assert!(solver_caps.contains(&"solve"));
        assert_eq!(agents[0]["capabilities"][0]["parameters"]["type"], "object");
    }
}
