// ABOUTME: Generation gateway for switchboard, the boundary to the external LLM service.
// ABOUTME: Exposes free-text and shape-conforming structured generation behind one trait.

pub mod client;
pub mod gateway;
pub mod policy;
pub mod providers;
pub mod schema;
pub mod testing;

pub use client::create_gateway;
pub use gateway::{GatewayError, GenerationGateway, Message, Role, Shape, generate_typed};
pub use policy::{RetryingGateway, TimeoutGateway};
