// ABOUTME: Factory function for creating generation gateways by provider name.
// ABOUTME: Resolves provider name + optional model into a configured Arc<dyn GenerationGateway>.

use std::env;
use std::sync::Arc;

use crate::gateway::GenerationGateway;
use crate::providers::{AnthropicGateway, GeminiGateway, OpenAIGateway, anthropic, gemini, openai};

/// Create a generation gateway for the given provider name.
///
/// The model is resolved from:
/// 1. The explicit `model` parameter (if Some)
/// 2. A provider-specific environment variable (e.g. GEMINI_MODEL)
/// 3. A sensible default for that provider
pub fn create_gateway(
    provider: &str,
    model: Option<&str>,
) -> Result<Arc<dyn GenerationGateway>, anyhow::Error> {
    match provider {
        "gemini" => {
            let api_key = env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;
            let resolved_model = resolve_model(model, "GEMINI_MODEL", gemini::DEFAULT_MODEL);
            let mut gateway = GeminiGateway::new(
                api_key,
                "https://generativelanguage.googleapis.com".to_string(),
                resolved_model,
            );
            if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
                gateway = gateway.with_base_url(base_url);
            }
            Ok(Arc::new(gateway))
        }
        "openai" => {
            let api_key = env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
            let resolved_model = resolve_model(model, "OPENAI_MODEL", openai::DEFAULT_MODEL);
            let mut gateway = OpenAIGateway::new(
                api_key,
                "https://api.openai.com".to_string(),
                resolved_model,
            );
            if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
                gateway = gateway.with_base_url(base_url);
            }
            Ok(Arc::new(gateway))
        }
        "anthropic" => {
            let api_key = env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
            let resolved_model = resolve_model(model, "ANTHROPIC_MODEL", anthropic::DEFAULT_MODEL);
            let mut gateway = AnthropicGateway::new(
                api_key,
                "https://api.anthropic.com".to_string(),
                resolved_model,
            );
            if let Ok(base_url) = env::var("ANTHROPIC_BASE_URL") {
                gateway = gateway.with_base_url(base_url);
            }
            Ok(Arc::new(gateway))
        }
        unknown => Err(anyhow::anyhow!("unsupported LLM provider: {}", unknown)),
    }
}

fn resolve_model(explicit: Option<&str>, env_var: &str, default: &str) -> String {
    explicit
        .map(String::from)
        .or_else(|| env::var(env_var).ok().filter(|m| !m.is_empty()))
        .unwrap_or_else(|| default.to_string())
}
