// ABOUTME: Built-in roster of specialist agents (WeatherForecaster, Researcher, Solver) and their capabilities.
// ABOUTME: Capabilities that need generation share the process-wide gateway handed to the roster.

pub mod calculator;
pub mod research;
pub mod roster;
pub mod solver;
pub mod weather;

pub use calculator::{CalculateCapability, EvalError, evaluate};
pub use research::ResearchCapability;
pub use roster::{default_registry, researcher, solver, weather_forecaster};
pub use solver::SolveCapability;
pub use weather::WeatherCapability;
