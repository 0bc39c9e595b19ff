// ABOUTME: HTTP server and process bootstrap for switchboard.
// ABOUTME: Loads env configuration, wires gateway + roster + history into an Orchestrator, and serves the API.

pub mod api;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use bootstrap::{build_gateway, build_state};
pub use config::{ConfigError, SwitchboardConfig};
pub use routes::create_router;
