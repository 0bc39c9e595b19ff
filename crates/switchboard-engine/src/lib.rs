// ABOUTME: Orchestration engine: plan a request, dispatch agent tasks, and synthesize one answer.
// ABOUTME: All generation goes through the GenerationGateway; the engine itself never retries.

pub mod config;
pub mod dispatcher;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod runner;
pub mod synthesizer;

pub use config::EngineConfig;
pub use dispatcher::Dispatcher;
pub use orchestrator::Orchestrator;
pub use planner::Planner;
pub use runner::TaskRunner;
pub use synthesizer::Synthesizer;
