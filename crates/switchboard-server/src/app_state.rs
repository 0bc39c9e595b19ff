// ABOUTME: Shared application state for the switchboard HTTP server and the one-shot CLI.
// ABOUTME: Holds the orchestrator and the optional conversation log that only this layer appends to.

use std::sync::Arc;

use switchboard_core::{OrchestrationError, OrchestrationResult};
use switchboard_engine::Orchestrator;
use switchboard_gateway::Role;
use switchboard_store::JsonlHistory;

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub orchestrator: Orchestrator,
    /// Conversation log; `None` when history is disabled.
    pub history: Option<Arc<JsonlHistory>>,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(orchestrator: Orchestrator, history: Option<Arc<JsonlHistory>>) -> Self {
        Self {
            orchestrator,
            history,
        }
    }

    /// Orchestrate `query`, logging the query before the run and the answer
    /// after a successful one.
    pub async fn ask(&self, query: &str) -> Result<OrchestrationResult, OrchestrationError> {
        self.remember(Role::User, query);
        let result = self.orchestrator.orchestrate(query).await?;
        self.remember(Role::Assistant, &result.final_answer);
        Ok(result)
    }

    // A failed append is logged and does not fail the request.
    fn remember(&self, role: Role, content: &str) {
        if let Some(history) = &self.history
            && let Err(e) = history.append_message(role, content)
        {
            tracing::warn!(error = %e, path = %history.path().display(), "failed to append to conversation log");
        }
    }
}
