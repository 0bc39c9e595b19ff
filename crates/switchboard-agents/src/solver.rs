// ABOUTME: The solve capability, which asks the generation gateway for a step-by-step solution.
// ABOUTME: The summary field is the last two lines of the generated solution.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use switchboard_core::{Capability, CapabilityError};
use switchboard_gateway::{GenerationGateway, Message};

const PROBLEM_TYPES: [&str; 3] = ["mathematical", "logical", "analytical"];
const DEFAULT_TYPE: &str = "mathematical";

pub struct SolveCapability {
    gateway: Arc<dyn GenerationGateway>,
}

impl SolveCapability {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self { gateway }
    }
}

fn summarize(solution: &str) -> String {
    let lines: Vec<&str> = solution.lines().collect();
    let start = lines.len().saturating_sub(2);
    lines[start..].join("\n")
}

#[async_trait]
impl Capability for SolveCapability {
    fn name(&self) -> &str {
        "solve"
    }

    fn description(&self) -> &str {
        "Solve a given problem with detailed, step-by-step reasoning"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "problem": {
                    "type": "string",
                    "description": "The problem statement"
                },
                "type": {
                    "type": "string",
                    "enum": PROBLEM_TYPES,
                    "description": "Type of problem"
                }
            },
            "required": ["problem"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, CapabilityError> {
        let problem = args
            .get("problem")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CapabilityError::InvalidArguments("missing 'problem'".to_string()))?;

        let kind = match args.get("type").and_then(|v| v.as_str()) {
            None => DEFAULT_TYPE,
            Some(kind) if PROBLEM_TYPES.contains(&kind) => kind,
            Some(other) => {
                return Err(CapabilityError::InvalidArguments(format!(
                    "unknown problem type '{}'",
                    other
                )));
            }
        };

        let system = format!(
            "You are an expert in {} problem-solving. Provide a clear, step-by-step solution.",
            kind
        );
        let solution = self
            .gateway
            .generate_text(&system, &[Message::user(problem)])
            .await
            .map_err(|e| CapabilityError::Failed(format!("solver generation failed: {}", e)))?;

        Ok(json!({
            "problem": problem,
            "type": kind,
            "step_by_step_solution": solution,
            "summary": summarize(&solution)
        }))
    }
}
