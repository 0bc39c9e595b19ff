// ABOUTME: OpenAI API adapter implementing the GenerationGateway trait.
// ABOUTME: Uses Chat Completions, with response_format json_schema for structured generation.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::gateway::{GatewayError, GenerationGateway, Message, Shape};
use crate::providers::{
    MAX_TOKENS, ensure_conforms, parse_json_reply, read_json_body, transport_error,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI gateway adapter. Calls the Chat Completions API and, for shapes,
/// asks for a `json_schema` response format.
pub struct OpenAIGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIGateway {
    /// Create a new OpenAIGateway reading configuration from environment variables.
    /// Required: `OPENAI_API_KEY`
    /// Optional: `OPENAI_BASE_URL` (defaults to https://api.openai.com)
    /// Optional: `OPENAI_MODEL` (defaults to gpt-4o)
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| GatewayError::ProviderError("OPENAI_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, base_url, model))
    }

    /// Create a new OpenAIGateway with explicit configuration.
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

    /// Build the JSON request body for the Chat Completions API.
    pub fn build_request_body(
        &self,
        system: &str,
        messages: &[Message],
        shape: Option<&Shape>,
    ) -> Value {
        let mut chat = vec![json!({
            "role": "system",
            "content": system
        })];

        for msg in messages {
            chat.push(json!({
                "role": msg.role.as_str(),
                "content": msg.content
            }));
        }

        // Ensure at least one user message after system
        if chat.len() == 1 {
            chat.push(json!({
                "role": "user",
                "content": "Please respond."
            }));
        }

        let mut body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": chat
        });

        if let Some(shape) = shape {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": shape.name,
                    "description": shape.description,
                    "schema": shape.schema,
                    "strict": false
                }
            });
        }

        body
    }

    /// Extract the assistant message content of the first choice.
    pub fn parse_text(response_body: &Value) -> Result<String, GatewayError> {
        let message = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| {
                GatewayError::MalformedOutput("missing choices in response".to_string())
            })?;

        if let Some(refusal) = message.get("refusal").and_then(|r| r.as_str()) {
            return Err(GatewayError::ProviderError(format!(
                "model refused: {}",
                refusal
            )));
        }

        message
            .get("content")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(String::from)
            .ok_or_else(|| GatewayError::MalformedOutput("no content in response".to_string()))
    }

    async fn send(&self, body: &Value) -> Result<Value, GatewayError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(provider = "openai", model = %self.model, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_json_body(response, "OPENAI_API_KEY").await
    }
}

#[async_trait]
impl GenerationGateway for OpenAIGateway {
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
        let text = Self::parse_text(&response_body)?;
        ensure_conforms(parse_json_reply(&text)?, shape)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
