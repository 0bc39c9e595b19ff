// ABOUTME: Shared fixtures for engine integration tests: scripted agents backed by mock capabilities.
// ABOUTME: Each fixture agent has a distinct system prompt so one scripted gateway can tell them apart.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use switchboard_core::testing::MockCapability;
use switchboard_core::{Agent, AgentRef, AgentRegistry, CapabilityRegistry, Plan, Strategy, Task};
use switchboard_gateway::testing::ScriptedGateway;

pub fn system_prompt(agent_ref: AgentRef) -> String {
    format!("You are the {} fixture.", agent_ref)
}

/// Structured reply selecting `tool` with `parameters`.
pub fn selection(tool: &str, parameters: Value) -> Value {
    json!({
        "tool_to_use": tool,
        "parameters": parameters,
        "reasoning": "fixture choice"
    })
}

/// A gateway where each agent in `tools` selects its tool, and every
/// interpretation answers "<agent> interpreted".
pub fn selecting_gateway(tools: &[(AgentRef, &str)]) -> ScriptedGateway {
    let mut gateway = ScriptedGateway::new();
    for (agent_ref, tool) in tools {
        gateway = gateway
            .structured_when(&system_prompt(*agent_ref), selection(tool, json!({})))
            .text_when(&system_prompt(*agent_ref), &format!("{} interpreted", agent_ref));
    }
    gateway
}

pub fn agent(
    agent_ref: AgentRef,
    gateway: Arc<ScriptedGateway>,
    capabilities: &[MockCapability],
) -> Agent {
    let registry = CapabilityRegistry::from_capabilities(
        capabilities
            .iter()
            .cloned()
            .map(|c| Arc::new(c) as Arc<dyn switchboard_core::Capability>)
            .collect(),
    )
    .unwrap();
    Agent::new(
        agent_ref,
        format!("{} fixture agent", agent_ref),
        system_prompt(agent_ref),
        registry,
        gateway,
    )
}

pub fn registry(agents: Vec<Agent>) -> Arc<AgentRegistry> {
    Arc::new(AgentRegistry::new(agents).unwrap())
}

pub fn plan(strategy: Strategy, tasks: Vec<Task>) -> Plan {
    Plan {
        understanding: "fixture".to_string(),
        agents_to_use: tasks.iter().map(|task| task.agent).collect(),
        tasks,
        strategy,
        rationale: "fixture".to_string(),
    }
}
