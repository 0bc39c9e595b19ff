// ABOUTME: Google Gemini API adapter implementing the GenerationGateway trait.
// ABOUTME: Translates system prompts and messages into generateContent calls, with JSON mode for shapes.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::gateway::{GatewayError, GenerationGateway, Message, Role, Shape};
use crate::providers::{
    MAX_TOKENS, ensure_conforms, parse_json_reply, read_json_body, structured_instruction,
    transport_error,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub(crate) const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Google Gemini gateway adapter. Calls the generateContent API; structured
/// requests switch the response MIME type to JSON and carry the schema in the
/// system instruction.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiGateway {
    /// Create a new GeminiGateway reading configuration from environment variables.
    /// Required: `GEMINI_API_KEY`
    /// Optional: `GEMINI_BASE_URL` (defaults to https://generativelanguage.googleapis.com)
    /// Optional: `GEMINI_MODEL` (defaults to gemini-2.0-flash-001)
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GatewayError::ProviderError("GEMINI_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, base_url, model))
    }

    /// Create a new GeminiGateway with explicit configuration.
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

    /// Build the JSON request body for the Gemini generateContent API.
    /// Passing a shape turns on JSON output mode.
    pub fn build_request_body(
        &self,
        system: &str,
        messages: &[Message],
        shape: Option<&Shape>,
    ) -> Value {
        let system_text = match shape {
            Some(shape) => structured_instruction(system, shape),
            None => system.to_string(),
        };

        let mut contents: Vec<Value> = messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                json!({
                    "role": role,
                    "parts": [{"text": msg.content}]
                })
            })
            .collect();

        // Gemini rejects an empty contents array
        if contents.is_empty() {
            contents.push(json!({
                "role": "user",
                "parts": [{"text": "Please respond."}]
            }));
        }

        let contents = coalesce_gemini_contents(contents);

        let mut generation_config = json!({ "max_output_tokens": MAX_TOKENS });
        if shape.is_some() {
            generation_config["response_mime_type"] = json!("application/json");
        }

        json!({
            "system_instruction": {
                "parts": [{"text": system_text}]
            },
            "contents": contents,
            "generation_config": generation_config
        })
    }

    /// Extract the concatenated text of the first candidate.
    pub fn parse_text(response_body: &Value) -> Result<String, GatewayError> {
        let candidate = response_body
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| {
                GatewayError::MalformedOutput("missing candidates in response".to_string())
            })?;

        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| {
                GatewayError::MalformedOutput("missing parts array in content".to_string())
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            let finish_reason = candidate
                .get("finishReason")
                .and_then(|f| f.as_str())
                .unwrap_or("unknown");
            return Err(GatewayError::MalformedOutput(format!(
                "no text in response (finishReason: {})",
                finish_reason
            )));
        }

        Ok(text)
    }

    async fn send(&self, body: &Value) -> Result<Value, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        tracing::debug!(provider = "gemini", model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_json_body(response, "GEMINI_API_KEY").await
    }
}

/// Coalesce consecutive Gemini contents with the same role.
fn coalesce_gemini_contents(contents: Vec<Value>) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::new();

    for content in contents {
        let role = content
            .get("role")
            .and_then(|r| r.as_str())
            .unwrap_or("user")
            .to_string();
        let text = content
            .get("parts")
            .and_then(|p| p.as_array())
            .and_then(|arr| arr.first())
            .and_then(|part| part.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .to_string();

        if let Some(last) = result.last_mut()
            && last.get("role").and_then(|r| r.as_str()) == Some(role.as_str())
        {
            let prev = last
                .get("parts")
                .and_then(|p| p.as_array())
                .and_then(|arr| arr.first())
                .and_then(|part| part.get("text"))
                .and_then(|t| t.as_str())
                .unwrap_or("")
                .to_string();
            *last = json!({
                "role": role,
                "parts": [{"text": format!("{}\n\n{}", prev, text)}]
            });
            continue;
        }

        result.push(json!({
            "role": role,
            "parts": [{"text": text}]
        }));
    }

    result
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
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
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gateway() -> GeminiGateway {
        GeminiGateway::new(
            "test-key".to_string(),
            DEFAULT_BASE_URL.to_string(),
            "gemini-2.0-flash-001".to_string(),
        )
    }

    #[test]
    fn gemini_gateway_creation() {
        let gateway = test_gateway();
        assert_eq!(gateway.provider_name(), "gemini");
        assert_eq!(gateway.model_name(), "gemini-2.0-flash-001");
        assert_eq!(gateway.api_key, "test-key");
    }

    #[test]
    fn gemini_builds_text_request_body() {
        let gateway = test_gateway();
        let messages = vec![
            Message::user("Task description"),
            Message::assistant("I will use the getWeather tool."),
            Message::user("Here are the tool results"),
        ];

        let body = gateway.build_request_body("You are a weather expert.", &messages, None);

        let system = body["system_instruction"]["parts"][0]["text"].as_str().unwrap();
        assert_eq!(system, "You are a weather expert.");

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert!(body["generation_config"].get("response_mime_type").is_none());
    }

    #[test]
    fn gemini_structured_request_sets_json_mode() {
        let gateway = test_gateway();
        let shape = Shape::new("plan", "An execution plan", json!({"type": "object"}));
        let body = gateway.build_request_body("Plan it.", &[Message::user("go")], Some(&shape));

        assert_eq!(
            body["generation_config"]["response_mime_type"],
            "application/json"
        );
        let system = body["system_instruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(system.contains("JSON schema"));
    }

    #[test]
    fn gemini_empty_messages_get_placeholder() {
        let body = test_gateway().build_request_body("sys", &[], None);
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn gemini_coalesces_same_role() {
        let body = test_gateway().build_request_body(
            "sys",
            &[Message::user("First"), Message::user("Second")],
            None,
        );
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        let text = contents[0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("First") && text.contains("Second"));
    }

    #[test]
    fn gemini_parses_text_response() {
        let response = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Paris is "}, {"text": "sunny."}]
                },
                "finishReason": "STOP"
            }]
        });

        assert_eq!(GeminiGateway::parse_text(&response).unwrap(), "Paris is sunny.");
    }

    #[test]
    fn gemini_rejects_empty_candidates() {
        let err = GeminiGateway::parse_text(&json!({"candidates": []})).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedOutput(_)));
    }

    #[test]
    fn gemini_reports_finish_reason_when_no_text() {
        let response = json!({
            "candidates": [{
                "content": {"role": "model", "parts": []},
                "finishReason": "SAFETY"
            }]
        });
        let err = GeminiGateway::parse_text(&response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    #[cfg(feature = "live-test")]
    async fn gemini_live_structured() {
        let gateway = GeminiGateway::from_env().expect("GEMINI_API_KEY must be set");
        let shape = Shape::new(
            "answer",
            "A short answer",
            json!({
                "type": "object",
                "properties": {"answer": {"type": "string"}},
                "required": ["answer"]
            }),
        );
        let value = gateway
            .generate_structured("Answer briefly.", &[Message::user("What is 2 + 2?")], &shape)
            .await;
        assert!(value.is_ok(), "live test failed: {:?}", value.err());
    }
}
