// ABOUTME: System prompts, user messages, and requested shapes for every generation call the engine makes.
// ABOUTME: Keeping them together makes the planner, runner, and synthesizer read as pure control flow.

use serde_json::{Value, json};
use switchboard_core::{
    Agent, AgentRegistry, ConversationEntry, Plan, ResultMap, Strategy, Task,
};
use switchboard_gateway::{Message, Shape};

const ORCHESTRATOR_SYSTEM_PROMPT: &str = "You are the orchestrator agent. Your job is to:\n\
    1. Understand the user's query.\n\
    2. Decide which specialized agents should be involved.\n\
    3. Formulate clear, detailed tasks for each selected agent.\n\
    4. Specify if tasks should run sequentially, in parallel, or conditionally (best effort, \
    skipping tasks that fail).\n\
    Provide a summary of your understanding, list the agents to involve, outline specific tasks \
    with parameters, and explain your reasoning. If the query fits none of the agents, return an \
    empty agents_to_use and an empty tasks list.";

const SYNTHESIS_SYSTEM_PROMPT: &str = "You are a synthesis agent. Your task is to integrate \
    results from multiple specialized agents into a comprehensive and coherent answer for the user.";

/// Planner system prompt listing every registered agent with its description.
pub fn planner_system(agents: &AgentRegistry) -> String {
    let roster: Vec<String> = agents
        .iter()
        .map(|agent| format!("- {}: {}", agent.name(), agent.description))
        .collect();
    format!(
        "{}\n\nAvailable agents:\n{}",
        ORCHESTRATOR_SYSTEM_PROMPT,
        roster.join("\n")
    )
}

/// The planner's user message, prefixed with recent history when there is any.
pub fn planner_messages(request: &str, history: &[ConversationEntry]) -> Vec<Message> {
    if history.is_empty() {
        return vec![Message::user(request)];
    }

    let transcript: Vec<String> = history
        .iter()
        .map(|entry| format!("{}: {}", entry.role.as_str(), entry.content))
        .collect();
    vec![Message::user(format!(
        "Here's our recent conversation history:\n{}\n\nCurrent query: {}",
        transcript.join("\n"),
        request
    ))]
}

/// Plan shape with agent names restricted to the registered set.
pub fn plan_shape(agents: &AgentRegistry) -> Shape {
    let names: Vec<&str> = agents.refs().iter().map(|agent| agent.label()).collect();
    let strategies: Vec<&str> = Strategy::ALL.iter().map(Strategy::label).collect();

    Shape::new(
        "orchestration_plan",
        "Which agents to run, their tasks, and the execution strategy",
        json!({
            "type": "object",
            "properties": {
                "understanding": {
                    "type": "string",
                    "description": "Summary of the user query"
                },
                "agents_to_use": {
                    "type": "array",
                    "items": {"type": "string", "enum": names},
                    "description": "Agents selected for this task"
                },
                "tasks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "agent": {"type": "string", "enum": names},
                            "task_description": {"type": "string"},
                            "required_parameters": {"type": "object"}
                        },
                        "required": ["agent", "task_description"]
                    }
                },
                "execution_plan": {
                    "type": "string",
                    "enum": strategies,
                    "description": "Execution strategy for tasks"
                },
                "reason": {
                    "type": "string",
                    "description": "Reasoning behind the orchestration plan"
                }
            },
            "required": ["understanding", "agents_to_use", "tasks", "execution_plan", "reason"]
        }),
    )
}

pub fn selection_system(agent: &Agent) -> String {
    format!(
        "{} Plan your response by selecting an appropriate tool from: {}.",
        agent.system_prompt,
        agent.capabilities.names().join(", ")
    )
}

pub fn selection_message(agent: &Agent, task: &Task, request: &str) -> Message {
    let tools: Vec<String> = agent
        .capabilities
        .iter()
        .map(|capability| format!("{} ({})", capability.name(), capability.input_schema()))
        .collect();

    let mut content = format!(
        "Original Query: {}\nTask Description: {}\nAvailable Tools: {}\n",
        request,
        task.description,
        tools.join(", ")
    );
    if let Some(parameters) = &task.parameters {
        content.push_str(&format!("Suggested Parameters: {}\n", json!(parameters)));
    }
    content.push_str("Provide your tool selection and parameters.");
    Message::user(content)
}

/// Selection shape. The tool name is a free string so that an unknown name
/// reaches the runner, which rejects it against the registry.
pub fn selection_shape() -> Shape {
    Shape::new(
        "tool_selection",
        "The single tool to run for this task and its arguments",
        json!({
            "type": "object",
            "properties": {
                "tool_to_use": {
                    "type": "string",
                    "description": "The chosen tool for this task"
                },
                "parameters": {
                    "type": "object",
                    "description": "Parameters to pass to the tool"
                },
                "reasoning": {
                    "type": "string",
                    "description": "Rationale for the chosen approach"
                }
            },
            "required": ["tool_to_use", "parameters", "reasoning"]
        }),
    )
}

pub fn interpretation_messages(task: &Task, capability: &str, raw_output: &Value) -> Vec<Message> {
    let pretty = serde_json::to_string_pretty(raw_output).unwrap_or_else(|_| raw_output.to_string());
    vec![
        Message::user(task.description.clone()),
        Message::assistant(format!(
            "I will use the {} tool to address the task.",
            capability
        )),
        Message::user(format!(
            "Here are the tool results:\n{}\nInterpret these results and provide your final \
             response for the task.",
            pretty
        )),
    ]
}

pub fn synthesis_system() -> &'static str {
    SYNTHESIS_SYSTEM_PROMPT
}

pub fn synthesis_message(request: &str, plan: &Plan, results: &ResultMap) -> Message {
    let plan_json = serde_json::to_string_pretty(plan).unwrap_or_default();
    let results_json = serde_json::to_string_pretty(results).unwrap_or_default();

    let instruction = if plan.is_unclassified() {
        "The request could not be matched to any available agent. Do not guess an answer. \
         Ask the user to clarify what they need, and mention what the available agents can help with."
    } else if results.is_empty() {
        "No agent data was available because every task failed. Explain to the user that the \
         information could not be gathered, without inventing any."
    } else {
        "Please synthesize these details into a final, clear response."
    };

    Message::user(format!(
        "Original Query: {}\nOrchestration Plan: {}\nAgent Outputs: {}\n{}",
        request, plan_json, results_json, instruction
    ))
}
