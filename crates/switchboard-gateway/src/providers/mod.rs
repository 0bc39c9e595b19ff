// ABOUTME: Provider module aggregating all LLM gateway adapters.
// ABOUTME: Holds the HTTP status mapping and JSON-reply helpers shared by every adapter.

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicGateway;
pub use gemini::GeminiGateway;
pub use openai::OpenAIGateway;

use serde_json::Value;

use crate::gateway::{GatewayError, Shape};
use crate::schema;

/// Maximum output tokens requested from every provider.
pub(crate) const MAX_TOKENS: u32 = 4096;

/// Append JSON-only instructions and the shape's schema to a system prompt.
/// Used by providers that have no native schema-constrained output mode.
pub fn structured_instruction(system: &str, shape: &Shape) -> String {
    format!(
        "{}\n\nRespond ONLY with a single JSON value named '{}' ({}). \
         It must conform to this JSON schema:\n{}",
        system.trim_end(),
        shape.name,
        shape.description,
        shape.schema
    )
}

/// Parse a model's text reply as JSON, tolerating a surrounding
/// markdown code fence such as ```json ... ```.
pub fn parse_json_reply(text: &str) -> Result<Value, GatewayError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(unfenced)
        .map_err(|e| GatewayError::MalformedOutput(format!("reply is not valid JSON: {}", e)))
}

/// Reject values that do not conform to the requested shape.
pub fn ensure_conforms(value: Value, shape: &Shape) -> Result<Value, GatewayError> {
    schema::conforms(&shape.schema, &value).map_err(|violation| {
        GatewayError::MalformedOutput(format!("'{}' violates its shape: {}", shape.name, violation))
    })?;
    Ok(value)
}

/// Turn an HTTP response into its JSON body, mapping failure statuses
/// onto gateway errors. `key_var` is named in the unauthorized message.
pub(crate) async fn read_json_body(
    response: reqwest::Response,
    key_var: &str,
) -> Result<Value, GatewayError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GatewayError::ProviderError("rate limited".to_string()));
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GatewayError::ProviderError(format!(
            "Unauthorized: check {}",
            key_var
        )));
    }

    if status.is_server_error() {
        return Err(GatewayError::ProviderError(format!(
            "Server error: {}",
            status
        )));
    }

    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(GatewayError::ProviderError(format!(
            "API error {}: {}",
            status, error_body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| GatewayError::MalformedOutput(format!("failed to parse JSON: {}", e)))
}

/// Map a transport-level reqwest failure.
pub(crate) fn transport_error(e: reqwest::Error) -> GatewayError {
    GatewayError::ProviderError(format!("HTTP request failed: {}", e))
}
