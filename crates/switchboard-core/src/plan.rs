// ABOUTME: Execution plan types produced by the planner: strategy, tasks, and the plan itself.
// ABOUTME: Field names on the wire match the planner's requested shape (agents_to_use, execution_plan, ...).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentRef;
use crate::error::PlanError;

/// How the dispatcher runs a plan's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Strictly in list order; the first failure aborts the rest.
    Sequential,
    /// All at once; every task runs to completion.
    Parallel,
    /// In list order; failed tasks are dropped and execution continues.
    Conditional,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Parallel, Strategy::Conditional];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Parallel => "parallel",
            Strategy::Conditional => "conditional",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of work for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub agent: AgentRef,
    #[serde(rename = "task_description")]
    pub description: String,
    #[serde(rename = "required_parameters", default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, Value>>,
}

impl Task {
    pub fn new(agent: AgentRef, description: impl Into<String>) -> Self {
        Self {
            agent,
            description: description.into(),
            parameters: None,
        }
    }
}

/// The planner's structured answer to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub understanding: String,
    pub agents_to_use: BTreeSet<AgentRef>,
    pub tasks: Vec<Task>,
    #[serde(rename = "execution_plan")]
    pub strategy: Strategy,
    #[serde(rename = "reason")]
    pub rationale: String,
}

impl Plan {
    /// Check the cross-field invariants the requested shape cannot express:
    /// every task targets an agent listed in `agents_to_use`, and a plan that
    /// names agents also has tasks.
    pub fn validate(&self) -> Result<(), PlanError> {
        if let Some(task) = self
            .tasks
            .iter()
            .find(|task| !self.agents_to_use.contains(&task.agent))
        {
            return Err(PlanError::InvalidPlan(format!(
                "task '{}' targets {} which is not in agents_to_use",
                task.description, task.agent
            )));
        }

        if self.tasks.is_empty() && !self.agents_to_use.is_empty() {
            return Err(PlanError::InvalidPlan(
                "agents_to_use is non-empty but the plan has no tasks".to_string(),
            ));
        }

        Ok(())
    }

    /// True when the request could not be assigned to any known agent.
    pub fn is_unclassified(&self) -> bool {
        self.agents_to_use.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(agents: &[AgentRef], tasks: Vec<Task>) -> Plan {
        Plan {
            understanding: "user wants things".to_string(),
            agents_to_use: agents.iter().copied().collect(),
            tasks,
            strategy: Strategy::Parallel,
            rationale: "independent lookups".to_string(),
        }
    }

    #[test]
    fn valid_plan_passes() {
        let plan = plan(
            &[AgentRef::WeatherForecaster, AgentRef::Researcher],
            vec![
                Task::new(AgentRef::WeatherForecaster, "weather in Paris"),
                Task::new(AgentRef::Researcher, "top 3 attractions in Paris"),
            ],
        );
        assert!(plan.validate().is_ok());
        assert!(!plan.is_unclassified());
    }

    #[test]
    fn task_outside_agents_to_use_is_invalid() {
        let plan = plan(
            &[AgentRef::WeatherForecaster],
            vec![
                Task::new(AgentRef::WeatherForecaster, "weather in Paris"),
                Task::new(AgentRef::Solver, "solve x"),
            ],
        );
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, PlanError::InvalidPlan(_)));
        assert!(err.to_string().contains("Solver"));
    }

    #[test]
    fn agents_without_tasks_is_invalid() {
        let plan = plan(&[AgentRef::Solver], Vec::new());
        assert!(matches!(plan.validate(), Err(PlanError::InvalidPlan(_))));
    }

    #[test]
    fn empty_plan_is_valid_and_unclassified() {
        let plan = plan(&[], Vec::new());
        assert!(plan.validate().is_ok());
        assert!(plan.is_unclassified());
    }

    #[test]
    fn tasks_with_no_agents_is_invalid() {
        let plan = plan(&[], vec![Task::new(AgentRef::Solver, "solve x")]);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn plan_deserializes_from_planner_wire_format() {
        let value = json!({
            "understanding": "Weather and sights in Paris",
            "agents_to_use": ["WeatherForecaster", "Researcher"],
            "tasks": [
                {
                    "agent": "WeatherForecaster",
                    "task_description": "Get the Paris forecast",
                    "required_parameters": {"location": "Paris"}
                },
                {"agent": "Researcher", "task_description": "Find top 3 attractions"}
            ],
            "execution_plan": "parallel",
            "reason": "The two lookups are independent"
        });

        let plan: Plan = serde_json::from_value(value).unwrap();
        assert_eq!(plan.strategy, Strategy::Parallel);
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(
            plan.tasks[0].parameters.as_ref().unwrap()["location"],
            json!("Paris")
        );
        assert!(plan.tasks[1].parameters.is_none());
        assert_eq!(plan.rationale, "The two lookups are independent");
    }

    #[test]
    fn unknown_strategy_fails_to_deserialize() {
        let value = json!({
            "understanding": "",
            "agents_to_use": [],
            "tasks": [],
            "execution_plan": "whenever",
            "reason": ""
        });
        assert!(serde_json::from_value::<Plan>(value).is_err());
    }
}
