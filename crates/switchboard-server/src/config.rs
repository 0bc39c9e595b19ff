// ABOUTME: Configuration loading and validation for the switchboard process.
// ABOUTME: Reads SWITCHBOARD_* environment variables and derives the engine configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use switchboard_engine::EngineConfig;
use switchboard_engine::config::{DEFAULT_HISTORY_LIMIT, DEFAULT_STEP_BUDGET};
use thiserror::Error;

pub const PROVIDERS: [&str; 3] = ["gemini", "openai", "anthropic"];

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SWITCHBOARD_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("SWITCHBOARD_PROVIDER must be one of gemini, openai, anthropic; got {0}")]
    UnknownProvider(String),
}

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SwitchboardConfig {
    pub home: PathBuf,
    pub bind: SocketAddr,
    pub provider: String,
    pub model: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub step_budget: u32,
    pub history_limit: usize,
    pub history_enabled: bool,
}

impl SwitchboardConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - SWITCHBOARD_HOME: data directory (default: ~/.switchboard)
    /// - SWITCHBOARD_BIND: socket address to bind (default: 127.0.0.1:7341)
    /// - SWITCHBOARD_PROVIDER: gemini, openai or anthropic (default: gemini)
    /// - SWITCHBOARD_MODEL: model override (optional)
    /// - SWITCHBOARD_TIMEOUT_SECS: per-call generation timeout (default: 60)
    /// - SWITCHBOARD_MAX_RETRIES: retries of transient generation failures (default: 2)
    /// - SWITCHBOARD_STEP_BUDGET: steps allowed per agent task (default: 3)
    /// - SWITCHBOARD_HISTORY_LIMIT: history entries shown to the planner (default: 10)
    /// - SWITCHBOARD_HISTORY: keep the conversation log at all (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("SWITCHBOARD_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".switchboard")
            });

        let bind_str =
            std::env::var("SWITCHBOARD_BIND").unwrap_or_else(|_| "127.0.0.1:7341".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let provider = std::env::var("SWITCHBOARD_PROVIDER")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "gemini".to_string())
            .to_lowercase();
        if !PROVIDERS.contains(&provider.as_str()) {
            return Err(ConfigError::UnknownProvider(provider));
        }

        let model = std::env::var("SWITCHBOARD_MODEL").ok().filter(|m| !m.is_empty());

        let timeout_secs: u64 = number("SWITCHBOARD_TIMEOUT_SECS", 60)?;
        let max_retries = number("SWITCHBOARD_MAX_RETRIES", 2)?;
        let step_budget = number("SWITCHBOARD_STEP_BUDGET", DEFAULT_STEP_BUDGET)?;
        let history_limit = number("SWITCHBOARD_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?;

        let history_enabled = std::env::var("SWITCHBOARD_HISTORY")
            .map(|v| !matches!(v.as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            home,
            bind,
            provider,
            model,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            step_budget,
            history_limit,
            history_enabled,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            step_budget: self.step_budget,
            history_limit: self.history_limit,
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.home.join("history.jsonl")
    }
}

/// Parse `var` as a number, falling back to `default` when unset or empty.
fn number<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        _ => Ok(default),
    }
}
