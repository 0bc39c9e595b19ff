// ABOUTME: Constructors for the built-in agents and the default agent registry.
// ABOUTME: Each agent pairs a role prompt with its fixed capability set and the shared gateway.

use std::sync::Arc;

use switchboard_core::{
    Agent, AgentRef, AgentRegistry, Capability, CapabilityRegistry, RegistryError,
};
use switchboard_gateway::GenerationGateway;

use crate::calculator::CalculateCapability;
use crate::research::ResearchCapability;
use crate::solver::SolveCapability;
use crate::weather::WeatherCapability;

const WEATHER_SYSTEM_PROMPT: &str = "You are a weather expert. Use your tools to analyze weather \
    data and provide accurate forecasts.";

const RESEARCH_SYSTEM_PROMPT: &str = "You are a research specialist. Use available tools to \
    gather, verify, and organize information.";

const SOLVER_SYSTEM_PROMPT: &str = "You are a problem-solving expert. Use your tools to provide \
    detailed and logical solutions to the given problems. Prefer the calculate tool when the task \
    is a plain arithmetic expression.";

fn registry(capabilities: Vec<Arc<dyn Capability>>) -> Result<CapabilityRegistry, RegistryError> {
    CapabilityRegistry::from_capabilities(capabilities)
}

pub fn weather_forecaster(gateway: Arc<dyn GenerationGateway>) -> Result<Agent, RegistryError> {
    Ok(Agent::new(
        AgentRef::WeatherForecaster,
        "Provides current weather data and forecasts",
        WEATHER_SYSTEM_PROMPT,
        registry(vec![Arc::new(WeatherCapability::new())])?,
        gateway,
    ))
}

pub fn researcher(gateway: Arc<dyn GenerationGateway>) -> Result<Agent, RegistryError> {
    Ok(Agent::new(
        AgentRef::Researcher,
        "Gathers and synthesizes information on a wide range of topics",
        RESEARCH_SYSTEM_PROMPT,
        registry(vec![Arc::new(ResearchCapability::new(gateway.clone()))])?,
        gateway,
    ))
}

pub fn solver(gateway: Arc<dyn GenerationGateway>) -> Result<Agent, RegistryError> {
    Ok(Agent::new(
        AgentRef::Solver,
        "Breaks down complex problems and solves them step-by-step",
        SOLVER_SYSTEM_PROMPT,
        registry(vec![
            Arc::new(SolveCapability::new(gateway.clone())),
            Arc::new(CalculateCapability::new()),
        ])?,
        gateway,
    ))
}

/// All built-in agents sharing one gateway.
pub fn default_registry(gateway: Arc<dyn GenerationGateway>) -> Result<AgentRegistry, RegistryError> {
    AgentRegistry::new(vec![
        weather_forecaster(gateway.clone())?,
        researcher(gateway.clone())?,
        solver(gateway)?,
    ])
}
