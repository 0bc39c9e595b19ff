// ABOUTME: Agent identities, agent definitions, and the table resolving each identity to its agent.
// ABOUTME: AgentRef is a closed enum so plans can only name agents the process actually built.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use switchboard_gateway::GenerationGateway;

use crate::capability::CapabilityRegistry;
use crate::error::RegistryError;

/// Identifies one of the specialist agents known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentRef {
    WeatherForecaster,
    Researcher,
    Solver,
}

impl AgentRef {
    pub const ALL: [AgentRef; 3] = [
        AgentRef::WeatherForecaster,
        AgentRef::Researcher,
        AgentRef::Solver,
    ];

    /// The agent's name as it appears in prompts and plans.
    pub fn label(&self) -> &'static str {
        match self {
            AgentRef::WeatherForecaster => "WeatherForecaster",
            AgentRef::Researcher => "Researcher",
            AgentRef::Solver => "Solver",
        }
    }
}

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgentRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentRef::ALL
            .into_iter()
            .find(|agent| agent.label() == s)
            .ok_or_else(|| format!("unknown agent: {}", s))
    }
}

/// A named role with a fixed capability set and a behavior-shaping system prompt.
pub struct Agent {
    pub agent_ref: AgentRef,
    pub description: String,
    pub system_prompt: String,
    pub capabilities: CapabilityRegistry,
    pub gateway: Arc<dyn GenerationGateway>,
}

impl Agent {
    pub fn new(
        agent_ref: AgentRef,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        capabilities: CapabilityRegistry,
        gateway: Arc<dyn GenerationGateway>,
    ) -> Self {
        Self {
            agent_ref,
            description: description.into(),
            system_prompt: system_prompt.into(),
            capabilities,
            gateway,
        }
    }

    pub fn name(&self) -> &'static str {
        self.agent_ref.label()
    }

    /// Public summary of the agent for listings.
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description,
            "capabilities": self.capabilities.definitions()
        })
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("agent_ref", &self.agent_ref)
            .field("description", &self.description)
            .field("capabilities", &self.capabilities)
            .field("provider", &self.gateway.provider_name())
            .finish()
    }
}

/// Table from agent identity to agent, resolved once at construction.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentRef, Arc<Agent>>,
}

impl AgentRegistry {
    /// Build the table, failing if two agents share an identity.
    pub fn new(agents: Vec<Agent>) -> Result<Self, RegistryError> {
        let mut table = BTreeMap::new();
        for agent in agents {
            let agent_ref = agent.agent_ref;
            if table.insert(agent_ref, Arc::new(agent)).is_some() {
                return Err(RegistryError::DuplicateAgent(agent_ref));
            }
        }
        tracing::debug!(agents = table.len(), "agent registry built");
        Ok(Self { agents: table })
    }

    pub fn get(&self, agent_ref: AgentRef) -> Option<&Arc<Agent>> {
        self.agents.get(&agent_ref)
    }

    pub fn contains(&self, agent_ref: AgentRef) -> bool {
        self.agents.contains_key(&agent_ref)
    }

    /// Registered identities in a stable order.
    pub fn refs(&self) -> Vec<AgentRef> {
        self.agents.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Agent>> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
