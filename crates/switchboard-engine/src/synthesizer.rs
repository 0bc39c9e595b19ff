// ABOUTME: Produces the final answer from the request, the plan, and the per-agent results.
// ABOUTME: Always calls the gateway, even with no results, so degradation wording comes from generation.

use std::sync::Arc;

use switchboard_core::{Plan, ResultMap, SynthesisError};
use switchboard_gateway::GenerationGateway;

use crate::prompts;

pub struct Synthesizer {
    gateway: Arc<dyn GenerationGateway>,
}

impl Synthesizer {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the generated text verbatim.
    pub async fn synthesize(
        &self,
        request: &str,
        plan: &Plan,
        results: &ResultMap,
    ) -> Result<String, SynthesisError> {
        let message = prompts::synthesis_message(request, plan, results);
        tracing::debug!(results = results.len(), prompt_chars = message.content.len(), "synthesizing");

        let answer = self
            .gateway
            .generate_text(prompts::synthesis_system(), &[message])
            .await
            .map_err(SynthesisError::GenerationFailed)?;

        tracing::info!(answer_chars = answer.len(), "synthesis done");
        Ok(answer)
    }
}
