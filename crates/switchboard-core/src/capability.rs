// ABOUTME: Capability (tool) trait and the per-agent registry mapping capability names to tools.
// ABOUTME: Registries are built once, reject duplicate names, and are read-only afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::RegistryError;

/// Errors a capability can return from `execute`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("execution failed: {0}")]
    Failed(String),
}

/// A named, schema-typed executable unit an agent may invoke.
///
/// Capabilities may be side-effecting. They are shared read-only across
/// concurrently running tasks.
#[async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments `execute` accepts.
    fn input_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<Value, CapabilityError>;
}

/// Fixed mapping from capability name to capability, owned by one agent.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: BTreeMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of capabilities, failing on duplicate names.
    pub fn from_capabilities(
        capabilities: Vec<Arc<dyn Capability>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for capability in capabilities {
            registry.register(capability)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, capability: Arc<dyn Capability>) -> Result<(), RegistryError> {
        let name = capability.name().to_string();
        if self.capabilities.contains_key(&name) {
            return Err(RegistryError::DuplicateCapability(name));
        }
        self.capabilities.insert(name, capability);
        Ok(())
    }

    /// Look up a capability by exact name. Names produced by a model are
    /// untrusted input and must go through this check.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    /// Capability names in sorted order.
    /// Capabilities in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Capability>> {
        self.capabilities.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.capabilities.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Provider-agnostic tool definitions (name, description, parameters).
    pub fn definitions(&self) -> Vec<Value> {
        self.iter()
            .map(|capability| {
                json!({
                    "name": capability.name(),
                    "description": capability.description(),
                    "parameters": capability.input_schema()
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.capabilities.keys()).finish()
    }
}
