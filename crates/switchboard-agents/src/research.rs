// ABOUTME: The research capability, which asks the generation gateway for information on a topic.
// ABOUTME: Depth (basic, detailed, comprehensive) shapes the research-assistant instruction.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use switchboard_core::{Capability, CapabilityError};
use switchboard_gateway::{GenerationGateway, Message};

const DEPTHS: [&str; 3] = ["basic", "detailed", "comprehensive"];
const DEFAULT_DEPTH: &str = "detailed";

pub struct ResearchCapability {
    gateway: Arc<dyn GenerationGateway>,
}

impl ResearchCapability {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self { gateway }
    }
}

fn research_system_prompt(depth: &str) -> String {
    format!(
        "You are a research assistant. Provide {} information about the query. \
         Cite sources if applicable.",
        depth
    )
}

#[async_trait]
impl Capability for ResearchCapability {
    fn name(&self) -> &str {
        "research"
    }

    fn description(&self) -> &str {
        "Research a specific topic and provide detailed information"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The topic or question to research"
                },
                "depth": {
                    "type": "string",
                    "enum": DEPTHS,
                    "description": "Level of detail required"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, CapabilityError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CapabilityError::InvalidArguments("missing 'query'".to_string()))?;

        let depth = match args.get("depth").and_then(|v| v.as_str()) {
            None => DEFAULT_DEPTH,
            Some(depth) if DEPTHS.contains(&depth) => depth,
            Some(other) => {
                return Err(CapabilityError::InvalidArguments(format!(
                    "unknown depth '{}'",
                    other
                )));
            }
        };

        tracing::debug!(query, depth, "researching");
        let results = self
            .gateway
            .generate_text(&research_system_prompt(depth), &[Message::user(query)])
            .await
            .map_err(|e| CapabilityError::Failed(format!("research generation failed: {}", e)))?;

        Ok(json!({
            "query": query,
            "depth": depth,
            "results": results,
            "sources": []
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_gateway::GatewayError;
    use switchboard_gateway::testing::ScriptedGateway;

    #[tokio::test]
    async fn returns_generated_research() {
        let gateway = Arc::new(
            ScriptedGateway::new().text_when("research assistant", "Louvre, Eiffel Tower, Orsay"),
        );
        let research = ResearchCapability::new(gateway.clone());

        let out = research
            .execute(json!({"query": "top 3 attractions in Paris"}))
            .await
            .unwrap();

        assert_eq!(out["depth"], "detailed");
        assert_eq!(out["results"], "Louvre, Eiffel Tower, Orsay");
        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("Provide detailed information"));
        assert_eq!(calls[0].messages[0].content, "top 3 attractions in Paris");
    }

    #[tokio::test]
    async fn rejects_unknown_depth() {
        let research = ResearchCapability::new(Arc::new(ScriptedGateway::new()));
        let err = research
            .execute(json!({"query": "x", "depth": "shallow"}))
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn gateway_failure_is_capability_failure() {
        let gateway = ScriptedGateway::new()
            .fail_text_when("", GatewayError::ProviderError("503".to_string()));
        let research = ResearchCapability::new(Arc::new(gateway));

        let err = research.execute(json!({"query": "x"})).await.unwrap_err();
        assert!(matches!(err, CapabilityError::Failed(_)));
    }
}
