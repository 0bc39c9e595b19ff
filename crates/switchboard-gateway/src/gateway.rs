// ABOUTME: Defines the GenerationGateway trait that every LLM provider adapter implements.
// ABOUTME: Also defines the message, shape, and error types shared by all gateway callers.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speaker of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of the ordered message sequence sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The requested shape of a structured generation: a named JSON schema.
///
/// Only a subset of JSON schema is understood (`type`, `properties`,
/// `required`, `enum`, `items`, `description`); see [`crate::schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl Shape {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// Errors the gateway can surface. Callers treat them as opaque.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed output: {0}")]
    MalformedOutput(String),

    #[error("provider error: {0}")]
    ProviderError(String),
}

impl GatewayError {
    /// Whether a retry has any chance of succeeding. Malformed output is
    /// treated as permanent for the same prompt.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Timeout(_) | GatewayError::ProviderError(_))
    }
}

/// Boundary to the external text/object generation service.
///
/// Implementations are stateless per call, so a single instance is shared
/// across concurrently running tasks without locking.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Generate free text from a system prompt and an ordered message list.
    async fn generate_text(
        &self,
        system: &str,
        messages: &[Message],
    ) -> Result<String, GatewayError>;

    /// Generate a JSON value conforming to `shape`.
    async fn generate_structured(
        &self,
        system: &str,
        messages: &[Message],
        shape: &Shape,
    ) -> Result<Value, GatewayError>;

    /// Provider name for logging and display (e.g. "gemini", "openai").
    fn provider_name(&self) -> &str;

    /// Model identifier being used.
    fn model_name(&self) -> &str;
}

/// Structured generation deserialized straight into `T`.
///
/// A value that conforms to the shape but still fails to deserialize is
/// reported as [`GatewayError::MalformedOutput`].
pub async fn generate_typed<T: DeserializeOwned>(
    gateway: &dyn GenerationGateway,
    system: &str,
    messages: &[Message],
    shape: &Shape,
) -> Result<T, GatewayError> {
    let value = gateway.generate_structured(system, messages, shape).await?;
    serde_json::from_value(value).map_err(|e| {
        GatewayError::MalformedOutput(format!("value does not fit '{}': {}", shape.name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_role() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("hello").role, Role::Assistant);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn transient_errors() {
        assert!(GatewayError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(GatewayError::ProviderError("503".to_string()).is_transient());
        assert!(!GatewayError::MalformedOutput("bad json".to_string()).is_transient());
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::ProviderError("connection reset".to_string());
        assert!(err.to_string().contains("connection reset"));

        let err = GatewayError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("x")).unwrap();
        assert!(json.contains("\"user\""));
    }
}
