// ABOUTME: Error taxonomy for orchestration: registry, planning, task, dispatch, synthesis, and top level.
// ABOUTME: The top-level error records the failing stage and whatever partial results were gathered.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use switchboard_gateway::GatewayError;

use crate::agent::AgentRef;
use crate::capability::CapabilityError;
use crate::plan::Plan;
use crate::result::ResultMap;

/// Construction-time errors for agent and capability tables.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate capability name: {0}")]
    DuplicateCapability(String),

    #[error("duplicate agent: {0}")]
    DuplicateAgent(AgentRef),
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error("plan generation failed: {0}")]
    GenerationFailed(#[source] GatewayError),
}

/// Why a single task did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("no agent registered for {0}")]
    UnknownAgent(AgentRef),

    #[error("capability selection failed: {0}")]
    SelectionFailed(#[source] GatewayError),

    #[error("{agent} selected unknown capability '{capability}'")]
    UnknownCapability { agent: AgentRef, capability: String },

    #[error("capability '{capability}' failed: {source}")]
    CapabilityFailed {
        capability: String,
        #[source]
        source: CapabilityError,
    },

    #[error("interpreting output of '{capability}' failed: {source}")]
    InterpretationFailed {
        capability: String,
        raw_output: Value,
        #[source]
        source: GatewayError,
    },

    #[error("step budget of {budget} exhausted before step {step}")]
    StepBudgetExceeded { budget: u32, step: u32 },
}

impl TaskError {
    /// Capability output produced before the failure, if any.
    pub fn raw_output(&self) -> Option<&Value> {
        match self {
            TaskError::InterpretationFailed { raw_output, .. } => Some(raw_output),
            _ => None,
        }
    }
}

/// A task that failed, identified by its position in the plan.
#[derive(Debug, thiserror::Error)]
#[error("task {index} ({agent}) failed: {error}")]
pub struct TaskFailure {
    pub index: usize,
    pub agent: AgentRef,
    #[source]
    pub error: TaskError,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{} of the plan's tasks failed", .failures.len())]
    PartialFailure {
        results: ResultMap,
        failures: Vec<TaskFailure>,
    },
}

impl DispatchError {
    pub fn results(&self) -> &ResultMap {
        match self {
            DispatchError::PartialFailure { results, .. } => results,
        }
    }

    pub fn failures(&self) -> &[TaskFailure] {
        match self {
            DispatchError::PartialFailure { failures, .. } => failures,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("synthesis generation failed: {0}")]
    GenerationFailed(#[source] GatewayError),
}

/// The phase of a run in which a fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Planning,
    Dispatch,
    Synthesis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Planning => "planning",
            Stage::Dispatch => "dispatch",
            Stage::Synthesis => "synthesis",
        };
        f.write_str(s)
    }
}

/// A failed run. Later stages carry the plan and any results gathered first.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("planning failed: {0}")]
    Planning(#[from] PlanError),

    #[error("dispatch failed: {error}")]
    Dispatch {
        plan: Box<Plan>,
        #[source]
        error: DispatchError,
    },

    #[error("synthesis failed: {error}")]
    Synthesis {
        plan: Box<Plan>,
        results: ResultMap,
        #[source]
        error: SynthesisError,
    },
}

impl OrchestrationError {
    pub fn stage(&self) -> Stage {
        match self {
            OrchestrationError::Planning(_) => Stage::Planning,
            OrchestrationError::Dispatch { .. } => Stage::Dispatch,
            OrchestrationError::Synthesis { .. } => Stage::Synthesis,
        }
    }

    pub fn plan(&self) -> Option<&Plan> {
        match self {
            OrchestrationError::Planning(_) => None,
            OrchestrationError::Dispatch { plan, .. } => Some(plan),
            OrchestrationError::Synthesis { plan, .. } => Some(plan),
        }
    }

    /// Per-agent results gathered before the failure. None for planning errors.
    pub fn partial_results(&self) -> Option<&ResultMap> {
        match self {
            OrchestrationError::Planning(_) => None,
            OrchestrationError::Dispatch { error, .. } => Some(error.results()),
            OrchestrationError::Synthesis { results, .. } => Some(results),
        }
    }
}
