// ABOUTME: Per-task results and the terminal artifact of one orchestration run.
// ABOUTME: Results are keyed by agent identity; the map implies no execution order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentRef;
use crate::plan::Plan;

/// What one agent did for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(rename = "tool_used")]
    pub capability_used: String,
    #[serde(rename = "tool_parameters")]
    pub arguments_used: Value,
    #[serde(rename = "tool_result")]
    pub raw_output: Value,
    #[serde(rename = "agent_interpretation")]
    pub interpretation: String,
}

pub type ResultMap = BTreeMap<AgentRef, TaskResult>;

/// A completed run: the plan, each agent's result, and the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub plan: Plan,
    pub results: ResultMap,
    pub final_answer: String,
}
