// ABOUTME: Engine tuning knobs: the per-task step budget and how much history the planner sees.
// ABOUTME: Plain values with defaults; the engine never reads the environment itself.

/// Steps the two-phase task protocol needs: select, execute, interpret.
pub const DEFAULT_STEP_BUDGET: u32 = 3;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Steps a single task may take before failing with `StepBudgetExceeded`.
    pub step_budget: u32,
    /// Recent conversation entries shown to the planner. 0 disables history.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_budget: DEFAULT_STEP_BUDGET,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
