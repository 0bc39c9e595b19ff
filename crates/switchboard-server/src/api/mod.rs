// ABOUTME: API module containing the HTTP handler functions for the switchboard REST API.
// ABOUTME: Organized into sub-modules for the agent roster and orchestration runs.

pub mod agents;
pub mod orchestrate;
