// ABOUTME: Core domain types for switchboard: agents, capabilities, plans, results, and errors.
// ABOUTME: Everything here is constructed once per process or per run and read-only afterwards.

pub mod agent;
pub mod capability;
pub mod error;
pub mod memory;
pub mod plan;
pub mod result;
pub mod testing;

pub use agent::{Agent, AgentRef, AgentRegistry};
pub use capability::{Capability, CapabilityError, CapabilityRegistry};
pub use error::{
    DispatchError, OrchestrationError, PlanError, RegistryError, Stage, SynthesisError,
    TaskError, TaskFailure,
};
pub use memory::{ConversationEntry, ConversationHistory, StaticHistory};
pub use plan::{Plan, Strategy, Task};
pub use result::{OrchestrationResult, ResultMap, TaskResult};
