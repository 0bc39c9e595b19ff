// ABOUTME: Integration tests for dispatch strategies: ordering, failure handling, and result folding.
// ABOUTME: Mock capabilities count calls so tests can prove which tasks ran.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use switchboard_core::testing::MockCapability;
use switchboard_core::{AgentRef, DispatchError, ResultMap, Strategy, Task, TaskError};
use switchboard_engine::{Dispatcher, TaskRunner};

use common::{agent, plan, registry, selecting_gateway};

const A: AgentRef = AgentRef::WeatherForecaster;
const B: AgentRef = AgentRef::Researcher;
const C: AgentRef = AgentRef::Solver;

struct Fixture {
    dispatcher: Dispatcher,
    a: MockCapability,
    b: MockCapability,
    c: MockCapability,
}

/// Three agents A, B, C where B's capability always fails.
fn fixture(a_delay: Duration, c_delay: Duration) -> Fixture {
    let gateway = Arc::new(selecting_gateway(&[(A, "tool_a"), (B, "tool_b"), (C, "tool_c")]));
    let a = MockCapability::new("tool_a", json!({"from": "a"})).with_delay(a_delay);
    let b = MockCapability::failing("tool_b", "upstream unavailable");
    let c = MockCapability::new("tool_c", json!({"from": "c"})).with_delay(c_delay);

    let agents = registry(vec![
        agent(A, gateway.clone(), &[a.clone()]),
        agent(B, gateway.clone(), &[b.clone()]),
        agent(C, gateway, &[c.clone()]),
    ]);
    Fixture {
        dispatcher: Dispatcher::new(agents, TaskRunner::default()),
        a,
        b,
        c,
    }
}

fn abc(strategy: Strategy) -> switchboard_core::Plan {
    plan(
        strategy,
        vec![
            Task::new(A, "task a"),
            Task::new(B, "task b"),
            Task::new(C, "task c"),
        ],
    )
}

#[tokio::test]
async fn sequential_stops_at_first_failure() {
    let f = fixture(Duration::ZERO, Duration::ZERO);

    let err = f
        .dispatcher
        .dispatch(&abc(Strategy::Sequential), "do a, b, c")
        .await
        .unwrap_err();

    let DispatchError::PartialFailure { results, failures } = err;
    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![A]);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 1);
    assert_eq!(failures[0].agent, B);
    assert!(matches!(failures[0].error, TaskError::CapabilityFailed { .. }));

    assert_eq!(f.a.calls(), 1);
    assert_eq!(f.b.calls(), 1);
    assert_eq!(f.c.calls(), 0, "C must never run after B fails");
}

#[tokio::test]
async fn conditional_skips_failures_and_continues() {
    let f = fixture(Duration::ZERO, Duration::ZERO);

    let results = f
        .dispatcher
        .dispatch(&abc(Strategy::Conditional), "do a, b, c")
        .await
        .unwrap();

    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![A, C]);
    assert_eq!(results[&A].interpretation, "WeatherForecaster interpreted");
    assert_eq!(results[&C].raw_output, json!({"from": "c"}));
    assert_eq!(f.c.calls(), 1);
}

#[tokio::test]
async fn parallel_waits_for_all_and_reports_failures() {
    let f = fixture(Duration::from_millis(30), Duration::ZERO);

    let err = f
        .dispatcher
        .dispatch(&abc(Strategy::Parallel), "do a, b, c")
        .await
        .unwrap_err();

    assert_eq!(err.results().keys().copied().collect::<Vec<_>>(), vec![A, C]);
    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].agent, B);
    assert_eq!(f.a.calls(), 1);
    assert_eq!(f.c.calls(), 1);
}

#[tokio::test]
async fn parallel_results_do_not_depend_on_completion_order() {
    async fn run(a_delay: Duration, c_delay: Duration) -> ResultMap {
        let f = fixture(a_delay, c_delay);
        let plan = plan(
            Strategy::Parallel,
            vec![Task::new(A, "task a"), Task::new(C, "task c")],
        );
        f.dispatcher.dispatch(&plan, "a and c").await.unwrap()
    }

    let a_last = run(Duration::from_millis(40), Duration::ZERO).await;
    let c_last = run(Duration::ZERO, Duration::from_millis(40)).await;

    assert_eq!(a_last, c_last);
    assert_eq!(a_last.len(), 2);
}

#[tokio::test]
async fn duplicate_agent_keeps_last_task_in_plan_order() {
    let gateway = Arc::new(
        switchboard_gateway::testing::ScriptedGateway::new()
            .structured_when("first job", common::selection("slow", json!({})))
            .structured_when("second job", common::selection("fast", json!({})))
            .text_when("", "interpreted"),
    );
    let slow = MockCapability::new("slow", json!("slow output")).with_delay(Duration::from_millis(40));
    let fast = MockCapability::new("fast", json!("fast output"));
    let dispatcher = Dispatcher::new(
        registry(vec![agent(C, gateway, &[slow.clone(), fast.clone()])]),
        TaskRunner::default(),
    );

    let plan = plan(
        Strategy::Parallel,
        vec![Task::new(C, "first job"), Task::new(C, "second job")],
    );
    let results = dispatcher.dispatch(&plan, "two jobs").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[&C].capability_used, "fast");
    assert_eq!(slow.calls(), 1);
    assert_eq!(fast.calls(), 1);
}

#[tokio::test]
async fn task_for_unregistered_agent_fails_with_unknown_agent() {
    let gateway = Arc::new(selecting_gateway(&[(A, "tool_a")]));
    let dispatcher = Dispatcher::new(
        registry(vec![agent(
            A,
            gateway,
            &[MockCapability::new("tool_a", json!(1))],
        )]),
        TaskRunner::default(),
    );

    let err = dispatcher
        .dispatch(
            &plan(Strategy::Sequential, vec![Task::new(B, "task b")]),
            "b",
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.failures()[0].error,
        TaskError::UnknownAgent(AgentRef::Researcher)
    ));
}

#[tokio::test]
async fn unknown_capability_under_conditional_is_dropped() {
    let gateway = Arc::new(selecting_gateway(&[(A, "tool_a"), (C, "not_a_tool")]));
    let c = MockCapability::new("tool_c", json!(1));
    let dispatcher = Dispatcher::new(
        registry(vec![
            agent(A, gateway.clone(), &[MockCapability::new("tool_a", json!(1))]),
            agent(C, gateway, &[c.clone()]),
        ]),
        TaskRunner::default(),
    );

    let results = dispatcher
        .dispatch(
            &plan(
                Strategy::Conditional,
                vec![Task::new(A, "task a"), Task::new(C, "task c")],
            ),
            "a and c",
        )
        .await
        .unwrap();

    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![A]);
    assert_eq!(c.calls(), 0);
}
