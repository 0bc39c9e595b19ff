// ABOUTME: Runs one task on one agent: select a capability, check its arguments, execute it once, interpret the output.
// ABOUTME: Every step draws from a fixed step budget; no step is ever repeated.

use serde::Deserialize;
use serde_json::Value;
use switchboard_core::{Agent, CapabilityError, Task, TaskError, TaskResult};
use switchboard_gateway::generate_typed;
use switchboard_gateway::schema::conforms;

use crate::config::DEFAULT_STEP_BUDGET;
use crate::prompts;

/// The agent's structured answer to the selection step.
#[derive(Debug, Deserialize)]
struct Selection {
    tool_to_use: String,
    #[serde(default)]
    parameters: Value,
    #[serde(default)]
    reasoning: String,
}

/// Counts steps against the budget and refuses any step past it.
struct StepCounter {
    budget: u32,
    taken: u32,
}

impl StepCounter {
    fn new(budget: u32) -> Self {
        Self { budget, taken: 0 }
    }

    fn take(&mut self) -> Result<(), TaskError> {
        let step = self.taken + 1;
        if step > self.budget {
            return Err(TaskError::StepBudgetExceeded {
                budget: self.budget,
                step,
            });
        }
        self.taken = step;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TaskRunner {
    step_budget: u32,
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_BUDGET)
    }
}

impl TaskRunner {
    pub fn new(step_budget: u32) -> Self {
        Self { step_budget }
    }

    pub fn step_budget(&self) -> u32 {
        self.step_budget
    }

    /// Run `task` on `agent`. A capability failure skips interpretation; an
    /// interpretation failure keeps the raw output in the error.
    pub async fn run(
        &self,
        agent: &Agent,
        task: &Task,
        request: &str,
    ) -> Result<TaskResult, TaskError> {
        let mut steps = StepCounter::new(self.step_budget);

        steps.take()?;
        let selection: Selection = generate_typed(
            agent.gateway.as_ref(),
            &prompts::selection_system(agent),
            &[prompts::selection_message(agent, task, request)],
            &prompts::selection_shape(),
        )
        .await
        .map_err(TaskError::SelectionFailed)?;

        tracing::debug!(
            agent = %agent.agent_ref,
            capability = %selection.tool_to_use,
            reasoning = %selection.reasoning,
            "capability selected"
        );

        let capability = agent
            .capabilities
            .resolve(&selection.tool_to_use)
            .ok_or_else(|| TaskError::UnknownCapability {
                agent: agent.agent_ref,
                capability: selection.tool_to_use.clone(),
            })?;

        let arguments = match selection.parameters {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        // The selection shape leaves arguments open; hold them to the
        // capability's own input schema before anything runs.
        if let Err(violation) = conforms(&capability.input_schema(), &arguments) {
            tracing::warn!(
                agent = %agent.agent_ref,
                capability = %selection.tool_to_use,
                %violation,
                "selected arguments do not match the capability schema"
            );
            return Err(TaskError::CapabilityFailed {
                capability: selection.tool_to_use,
                source: CapabilityError::InvalidArguments(violation),
            });
        }

        steps.take()?;
        let raw_output = capability
            .execute(arguments.clone())
            .await
            .map_err(|source| TaskError::CapabilityFailed {
                capability: selection.tool_to_use.clone(),
                source,
            })?;

        steps.take()?;
        let interpretation = match agent
            .gateway
            .generate_text(
                &agent.system_prompt,
                &prompts::interpretation_messages(task, &selection.tool_to_use, &raw_output),
            )
            .await
        {
            Ok(text) => text,
            Err(source) => {
                return Err(TaskError::InterpretationFailed {
                    capability: selection.tool_to_use,
                    raw_output,
                    source,
                });
            }
        };

        Ok(TaskResult {
            capability_used: selection.tool_to_use,
            arguments_used: arguments,
            raw_output,
            interpretation,
        })
    }
}
