// ABOUTME: Anthropic Claude API adapter implementing the GenerationGateway trait.
// ABOUTME: Structured generation forces a single tool whose input_schema is the requested shape.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::gateway::{GatewayError, GenerationGateway, Message, Shape};
use crate::providers::{MAX_TOKENS, ensure_conforms, read_json_body, transport_error};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub(crate) const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude gateway adapter. Calls the Messages API; structured
/// output is read back from the forced tool_use block.
pub struct AnthropicGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicGateway {
    /// Create a new AnthropicGateway reading configuration from environment variables.
    /// Required: `ANTHROPIC_API_KEY`
    /// Optional: `ANTHROPIC_BASE_URL` (defaults to https://api.anthropic.com)
    /// Optional: `ANTHROPIC_MODEL` (defaults to claude-sonnet-4-5-20250929)
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| GatewayError::ProviderError("ANTHROPIC_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, base_url, model))
    }

    /// Create a new AnthropicGateway with explicit configuration.
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the JSON request body for the Anthropic Messages API.
    pub fn build_request_body(
        &self,
        system: &str,
        messages: &[Message],
        shape: Option<&Shape>,
    ) -> Value {
        let mut conversation: Vec<Value> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                })
            })
            .collect();

        // Ensure there's at least one user message
        if conversation.is_empty() {
            conversation.push(json!({
                "role": "user",
                "content": "Please respond."
            }));
        }

        // Ensure messages alternate roles (Anthropic API requirement)
        let conversation = coalesce_messages(conversation);

        let mut body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": system,
            "messages": conversation
        });

        if let Some(shape) = shape {
            body["tools"] = json!([{
                "name": shape.name,
                "description": shape.description,
                "input_schema": shape.schema
            }]);
            body["tool_choice"] = json!({ "type": "tool", "name": shape.name });
        }

        body
    }

    /// Concatenate all text blocks of a Messages API response.
    pub fn parse_text(response_body: &Value) -> Result<String, GatewayError> {
        let content = content_blocks(response_body)?;

        let text: String = content
            .iter()
            .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            return Err(GatewayError::MalformedOutput(
                "no text content in response".to_string(),
            ));
        }

        Ok(text)
    }

    /// Pull the input of the tool_use block named after the shape.
    pub fn parse_tool_input(response_body: &Value, shape: &Shape) -> Result<Value, GatewayError> {
        let content = content_blocks(response_body)?;

        content
            .iter()
            .find(|block| {
                block.get("type").and_then(|t| t.as_str()) == Some("tool_use")
                    && block.get("name").and_then(|n| n.as_str()) == Some(shape.name.as_str())
            })
            .and_then(|block| block.get("input").cloned())
            .ok_or_else(|| {
                GatewayError::MalformedOutput(format!(
                    "no tool_use block for '{}' in response",
                    shape.name
                ))
            })
    }

    async fn send(&self, body: &Value) -> Result<Value, GatewayError> {
        let url = format!("{}/v1/messages", self.base_url);

        tracing::debug!(provider = "anthropic", model = %self.model, "sending messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_json_body(response, "ANTHROPIC_API_KEY").await
    }
}

fn content_blocks(response_body: &Value) -> Result<&Vec<Value>, GatewayError> {
    response_body
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| GatewayError::MalformedOutput("missing content array in response".to_string()))
}

/// Coalesce consecutive messages with the same role into single messages.
/// The Anthropic API requires alternating user/assistant messages.
fn coalesce_messages(messages: Vec<Value>) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::new();

    for msg in messages {
        let role = msg.get("role").and_then(|r| r.as_str()).unwrap_or("user");
        let content = msg
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or("")
            .to_string();

        if let Some(last) = result.last_mut() {
            let last_role = last.get("role").and_then(|r| r.as_str()).unwrap_or("");

            if last_role == role {
                let prev_content = last.get("content").and_then(|c| c.as_str()).unwrap_or("");
                let merged = format!("{}\n\n{}", prev_content, content);
                *last = json!({
                    "role": role,
                    "content": merged
                });
                continue;
            }
        }

        result.push(json!({
            "role": role,
            "content": content
        }));
    }

    result
}

#[async_trait]
impl GenerationGateway for AnthropicGateway {
    async fn generate_text(
        &self,
        system: &str,
        messages: &[Message],
    ) -> Result<String, GatewayError> {
        let body = self.build_request_body(system, messages, None);
        let response_body = self.send(&body).await?;
        Self::parse_text(&response_body)
    }

    async fn generate_structured(
        &self,
        system: &str,
        messages: &[Message],
        shape: &Shape,
    ) -> Result<Value, GatewayError> {
        let body = self.build_request_body(system, messages, Some(shape));
        let response_body = self.send(&body).await?;
        ensure_conforms(Self::parse_tool_input(&response_body, shape)?, shape)
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
