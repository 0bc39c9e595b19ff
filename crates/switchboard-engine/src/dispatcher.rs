// ABOUTME: Executes a plan's tasks against their agents under the plan's strategy.
// ABOUTME: Sequential aborts on the first failure, parallel waits for all, conditional drops failures.

use std::sync::Arc;

use futures::future::join_all;
use switchboard_core::{
    AgentRegistry, DispatchError, Plan, ResultMap, Strategy, Task, TaskError, TaskFailure,
    TaskResult,
};

use crate::runner::TaskRunner;

pub struct Dispatcher {
    agents: Arc<AgentRegistry>,
    runner: TaskRunner,
}

impl Dispatcher {
    pub fn new(agents: Arc<AgentRegistry>, runner: TaskRunner) -> Self {
        Self { agents, runner }
    }

    /// Run every task of `plan`. The returned map is keyed by agent; when an
    /// agent appears in several tasks, the task latest in plan order wins.
    pub async fn dispatch(&self, plan: &Plan, request: &str) -> Result<ResultMap, DispatchError> {
        tracing::info!(
            strategy = %plan.strategy,
            tasks = plan.tasks.len(),
            "dispatching plan"
        );

        match plan.strategy {
            Strategy::Sequential => self.sequential(plan, request).await,
            Strategy::Parallel => self.parallel(plan, request).await,
            Strategy::Conditional => Ok(self.conditional(plan, request).await),
        }
    }

    async fn sequential(&self, plan: &Plan, request: &str) -> Result<ResultMap, DispatchError> {
        let mut results = ResultMap::new();
        for (index, task) in plan.tasks.iter().enumerate() {
            match self.run_task(index, task, request).await {
                Ok(result) => {
                    results.insert(task.agent, result);
                }
                Err(failure) => {
                    tracing::warn!(
                        index,
                        agent = %task.agent,
                        error = %failure.error,
                        remaining = plan.tasks.len() - index - 1,
                        "sequential task failed, aborting remaining tasks"
                    );
                    return Err(DispatchError::PartialFailure {
                        results,
                        failures: vec![failure],
                    });
                }
            }
        }
        Ok(results)
    }

    async fn parallel(&self, plan: &Plan, request: &str) -> Result<ResultMap, DispatchError> {
        let outcomes = join_all(
            plan.tasks
                .iter()
                .enumerate()
                .map(|(index, task)| self.run_task(index, task, request)),
        )
        .await;

        // join_all yields outcomes in input order, so folding here makes the
        // map independent of completion order.
        let mut results = ResultMap::new();
        let mut failures = Vec::new();
        for (task, outcome) in plan.tasks.iter().zip(outcomes) {
            match outcome {
                Ok(result) => {
                    results.insert(task.agent, result);
                }
                Err(failure) => failures.push(failure),
            }
        }

        if failures.is_empty() {
            Ok(results)
        } else {
            Err(DispatchError::PartialFailure { results, failures })
        }
    }

    async fn conditional(&self, plan: &Plan, request: &str) -> ResultMap {
        let mut results = ResultMap::new();
        for (index, task) in plan.tasks.iter().enumerate() {
            match self.run_task(index, task, request).await {
                Ok(result) => {
                    results.insert(task.agent, result);
                }
                Err(failure) => {
                    tracing::warn!(
                        index,
                        agent = %task.agent,
                        error = %failure.error,
                        "conditional task failed, continuing"
                    );
                }
            }
        }
        results
    }

    async fn run_task(
        &self,
        index: usize,
        task: &Task,
        request: &str,
    ) -> Result<TaskResult, TaskFailure> {
        tracing::info!(index, agent = %task.agent, task = %task.description, "task started");

        let outcome = match self.agents.get(task.agent) {
            Some(agent) => self.runner.run(agent, task, request).await,
            None => Err(TaskError::UnknownAgent(task.agent)),
        };

        match outcome {
            Ok(result) => {
                tracing::info!(
                    index,
                    agent = %task.agent,
                    capability = %result.capability_used,
                    "task finished"
                );
                Ok(result)
            }
            Err(error) => Err(TaskFailure {
                index,
                agent: task.agent,
                error,
            }),
        }
    }
}
