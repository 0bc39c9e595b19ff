// ABOUTME: Turns a user request into a validated execution plan with one structured-generation call.
// ABOUTME: Recent conversation history, when configured, is shown to the model as read-only context.

use std::sync::Arc;

use switchboard_core::{AgentRegistry, ConversationHistory, Plan, PlanError};
use switchboard_gateway::{GenerationGateway, generate_typed};

use crate::prompts;

pub struct Planner {
    gateway: Arc<dyn GenerationGateway>,
    agents: Arc<AgentRegistry>,
    history: Option<Arc<dyn ConversationHistory>>,
    history_limit: usize,
}

impl Planner {
    pub fn new(gateway: Arc<dyn GenerationGateway>, agents: Arc<AgentRegistry>) -> Self {
        Self {
            gateway,
            agents,
            history: None,
            history_limit: 0,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn ConversationHistory>, limit: usize) -> Self {
        self.history = Some(history);
        self.history_limit = limit;
        self
    }

    /// Produce a plan for `request`. The gateway guarantees the shape; this
    /// re-checks the cross-field invariants and that every agent is registered.
    pub async fn plan(&self, request: &str) -> Result<Plan, PlanError> {
        let history = match &self.history {
            Some(history) if self.history_limit > 0 => history.recent(self.history_limit),
            _ => Vec::new(),
        };

        let messages = prompts::planner_messages(request, &history);
        tracing::debug!(history_entries = history.len(), "requesting plan");

        let plan: Plan = generate_typed(
            self.gateway.as_ref(),
            &prompts::planner_system(&self.agents),
            &messages,
            &prompts::plan_shape(&self.agents),
        )
        .await
        .map_err(PlanError::GenerationFailed)?;

        if let Some(unknown) = plan
            .agents_to_use
            .iter()
            .find(|agent| !self.agents.contains(**agent))
        {
            return Err(PlanError::InvalidPlan(format!(
                "plan uses {} which is not a registered agent",
                unknown
            )));
        }
        plan.validate()?;

        tracing::info!(
            strategy = %plan.strategy,
            agents = ?plan.agents_to_use,
            tasks = plan.tasks.len(),
            "plan produced"
        );
        Ok(plan)
    }
}
