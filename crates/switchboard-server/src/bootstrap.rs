// ABOUTME: Process bootstrap: provider gateway with timeout and retry wrappers, the built-in roster, and history.
// ABOUTME: Shared by `switchboard serve` and `switchboard ask` so both run the same orchestrator.

use std::sync::Arc;

use anyhow::Context;
use switchboard_agents::default_registry;
use switchboard_engine::Orchestrator;
use switchboard_gateway::{GenerationGateway, RetryingGateway, TimeoutGateway, create_gateway};
use switchboard_store::JsonlHistory;

use crate::app_state::AppState;
use crate::config::SwitchboardConfig;

/// Create the configured provider gateway and wrap it in the call policies.
pub fn build_gateway(config: &SwitchboardConfig) -> anyhow::Result<Arc<dyn GenerationGateway>> {
    let provider = create_gateway(&config.provider, config.model.as_deref())?;
    tracing::info!(
        provider = provider.provider_name(),
        model = provider.model_name(),
        "generation gateway ready"
    );
    Ok(wrap_gateway(provider, config))
}

/// Each attempt gets its own timeout; retries sit outside it.
pub fn wrap_gateway(
    inner: Arc<dyn GenerationGateway>,
    config: &SwitchboardConfig,
) -> Arc<dyn GenerationGateway> {
    let timed: Arc<dyn GenerationGateway> = Arc::new(TimeoutGateway::new(inner, config.timeout));
    if config.max_retries == 0 {
        timed
    } else {
        Arc::new(RetryingGateway::new(timed, config.max_retries))
    }
}

/// Assemble the orchestrator over `gateway` and open the conversation log if enabled.
pub fn build_state(
    config: &SwitchboardConfig,
    gateway: Arc<dyn GenerationGateway>,
) -> anyhow::Result<AppState> {
    let agents = default_registry(gateway.clone()).context("failed to build the agent roster")?;
    tracing::info!(agents = ?agents.refs(), "agent roster ready");

    let mut orchestrator = Orchestrator::new(gateway, agents, config.engine_config());

    let history = if config.history_enabled {
        let path = config.history_path();
        let history = Arc::new(
            JsonlHistory::open(&path)
                .with_context(|| format!("failed to open conversation log {}", path.display()))?,
        );
        tracing::info!(path = %path.display(), entries = history.len(), "conversation log loaded");
        orchestrator = orchestrator.with_history(history.clone());
        Some(history)
    } else {
        None
    };

    Ok(AppState::new(orchestrator, history))
}
