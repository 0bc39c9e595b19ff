// ABOUTME: End-to-end smoke test for the full switchboard request lifecycle over HTTP.
// ABOUTME: Drives the router with a scripted gateway: roster listing, a parallel run, and history carry-over.

use std::sync::Arc;

use axum::body::Body;
use http::Request;
use serde_json::{Value, json};
use switchboard_agents::default_registry;
use switchboard_engine::{EngineConfig, Orchestrator};
use switchboard_gateway::testing::ScriptedGateway;
use switchboard_server::{AppState, SharedState, create_router};
use switchboard_store::JsonlHistory;
use tower::ServiceExt;

/// Helper to extract JSON body from a response.
async fn json_body(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn post_query(state: &SharedState, query: &str) -> (u16, Value) {
    let app = create_router(Arc::clone(state));
    let resp = app
        .oneshot(
            Request::post("/api/orchestrate")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "query": query })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, json_body(resp).await)
}

fn scripted() -> ScriptedGateway {
    ScriptedGateway::new()
        .structured_when(
            "You are the orchestrator agent.",
            json!({
                "understanding": "Weather and attractions in Paris",
                "agents_to_use": ["WeatherForecaster", "Researcher"],
                "tasks": [
                    {"agent": "WeatherForecaster", "task_description": "Current weather in Paris"},
                    {
                        "agent": "Researcher",
                        "task_description": "Top 3 attractions in Paris",
                        "required_parameters": {"depth": "basic"}
                    }
                ],
                "execution_plan": "parallel",
                "reason": "The two lookups are independent"
            }),
        )
        .structured_when(
            "You are a weather expert.",
            json!({
                "tool_to_use": "get_weather",
                "parameters": {"location": "Paris"},
                "reasoning": "weather lookup"
            }),
        )
        .structured_when(
            "You are a research specialist.",
            json!({
                "tool_to_use": "research",
                "parameters": {"query": "top 3 attractions in Paris", "depth": "basic"},
                "reasoning": "needs research"
            }),
        )
        .text_when("You are a synthesis agent.", "Paris is mild today. Visit the Eiffel Tower, the Louvre and Notre-Dame.")
        .text_when("You are a research assistant.", "Eiffel Tower, Louvre, Notre-Dame")
        .text_when("You are a weather expert.", "Mild in Paris.")
        .text_when("You are a research specialist.", "Eiffel Tower, Louvre and Notre-Dame.")
}

#[tokio::test]
async fn smoke_test_full_lifecycle() {
    // 1. Conversation log in a temp home
    let dir = tempfile::TempDir::new().unwrap();
    let history = Arc::new(JsonlHistory::open(&dir.path().join("history.jsonl")).unwrap());

    // 2. Orchestrator over the built-in roster
    let gateway = Arc::new(scripted());
    let agents = default_registry(gateway.clone()).unwrap();
    let orchestrator = Orchestrator::new(gateway.clone(), agents, EngineConfig::default())
        .with_history(history.clone());
    let state: SharedState = Arc::new(AppState::new(orchestrator, Some(history.clone())));

    // 3. GET /health
    let resp = create_router(Arc::clone(&state))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // 4. GET /api/agents -> three built-in agents
    let resp = create_router(Arc::clone(&state))
        .oneshot(Request::get("/api/agents").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 3);

    // 5. POST /api/orchestrate -> parallel run over two agents
    let (status, json) = post_query(&state, "What's the weather in Paris and the top 3 attractions?").await;
    assert_eq!(status, 200, "orchestrate should succeed: {}", json);
    assert_eq!(json["success"], true);
    assert!(json["response"].as_str().unwrap().contains("Eiffel Tower"));
    assert_eq!(json["details"]["plan"]["execution_plan"], "parallel");

    let results = &json["details"]["results"];
    assert_eq!(results["WeatherForecaster"]["tool_used"], "get_weather");
    assert_eq!(results["WeatherForecaster"]["tool_result"]["location"], "Paris");
    assert_eq!(
        results["WeatherForecaster"]["tool_result"]["forecast"].as_array().unwrap().len(),
        3,
        "days defaults to 3"
    );
    assert_eq!(results["Researcher"]["tool_used"], "research");
    assert_eq!(results["Researcher"]["tool_result"]["depth"], "basic");
    assert_eq!(results["Researcher"]["agent_interpretation"], "Eiffel Tower, Louvre and Notre-Dame.");

    // 6. The query and the answer were logged
    assert_eq!(history.len(), 2);

    // 7. A follow-up query shows the planner the earlier exchange
    let (status, _) = post_query(&state, "And tomorrow?").await;
    assert_eq!(status, 200);
    let planner_calls: Vec<_> = gateway
        .calls()
        .into_iter()
        .filter(|call| call.system.starts_with("You are the orchestrator agent."))
        .collect();
    assert_eq!(planner_calls.len(), 2);
    let follow_up = &planner_calls[1].messages[0].content;
    assert!(follow_up.contains("user: What's the weather in Paris and the top 3 attractions?"));
    assert!(follow_up.contains("assistant: Paris is mild today."));
    assert!(follow_up.contains("Current query: And tomorrow?"));
    assert_eq!(history.len(), 4);

    // 8. History survives a reopen
    drop(state);
    let reopened = JsonlHistory::open(&dir.path().join("history.jsonl")).unwrap();
    assert_eq!(reopened.len(), 4);
}
