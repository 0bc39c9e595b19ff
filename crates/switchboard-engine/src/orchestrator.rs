// ABOUTME: Entry point of the engine: plan, dispatch, and synthesize one request inside a traced run.
// ABOUTME: Recovers parallel partial failures, treats sequential ones as fatal, and skips dispatch when unclassified.

use std::sync::Arc;

use switchboard_core::{
    AgentRegistry, ConversationHistory, DispatchError, OrchestrationError, OrchestrationResult,
    Plan, ResultMap, Strategy,
};
use switchboard_gateway::GenerationGateway;
use tracing::Instrument;
use ulid::Ulid;

use crate::config::EngineConfig;
use crate::dispatcher::Dispatcher;
use crate::planner::Planner;
use crate::runner::TaskRunner;
use crate::synthesizer::Synthesizer;

pub struct Orchestrator {
    agents: Arc<AgentRegistry>,
    config: EngineConfig,
    planner: Planner,
    dispatcher: Dispatcher,
    synthesizer: Synthesizer,
}

impl Orchestrator {
    /// `gateway` serves the planner and synthesizer; each agent carries its own.
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        agents: AgentRegistry,
        config: EngineConfig,
    ) -> Self {
        let agents = Arc::new(agents);
        Self {
            planner: Planner::new(gateway.clone(), agents.clone()),
            dispatcher: Dispatcher::new(agents.clone(), TaskRunner::new(config.step_budget)),
            synthesizer: Synthesizer::new(gateway),
            agents,
            config,
        }
    }

    /// Show the planner recent entries of `history`, up to the configured limit.
    pub fn with_history(mut self, history: Arc<dyn ConversationHistory>) -> Self {
        self.planner = self.planner.with_history(history, self.config.history_limit);
        self
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Run one request end to end.
    pub async fn orchestrate(
        &self,
        request: &str,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        let run_id = Ulid::new();
        let span = tracing::info_span!("orchestrate", %run_id);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &str) -> Result<OrchestrationResult, OrchestrationError> {
        tracing::info!(request_chars = request.len(), "orchestration started");

        let plan = self.planner.plan(request).await.map_err(|e| {
            tracing::error!(error = %e, "planning failed");
            OrchestrationError::Planning(e)
        })?;

        let results = if plan.is_unclassified() {
            tracing::info!("no agent matched the request, asking for clarification");
            ResultMap::new()
        } else {
            self.dispatch(&plan, request).await.map_err(|error| {
                tracing::error!(error = %error, "dispatch failed");
                OrchestrationError::Dispatch {
                    plan: Box::new(plan.clone()),
                    error,
                }
            })?
        };

        match self.synthesizer.synthesize(request, &plan, &results).await {
            Ok(final_answer) => {
                tracing::info!(agents = results.len(), "orchestration finished");
                Ok(OrchestrationResult {
                    plan,
                    results,
                    final_answer,
                })
            }
            Err(error) => {
                tracing::error!(error = %error, "synthesis failed");
                Err(OrchestrationError::Synthesis {
                    plan: Box::new(plan),
                    results,
                    error,
                })
            }
        }
    }

    /// Dispatch, keeping the partial map when independent parallel tasks fail.
    async fn dispatch(&self, plan: &Plan, request: &str) -> Result<ResultMap, DispatchError> {
        match self.dispatcher.dispatch(plan, request).await {
            Err(DispatchError::PartialFailure { results, failures })
                if plan.strategy == Strategy::Parallel =>
            {
                for failure in &failures {
                    tracing::warn!(
                        index = failure.index,
                        agent = %failure.agent,
                        error = %failure.error,
                        "parallel task failed, synthesizing without it"
                    );
                }
                Ok(results)
            }
            other => other,
        }
    }
}
