// ABOUTME: Persistence for switchboard: the conversation log kept outside the engine.
// ABOUTME: The log is append-only JSONL, replayed on open and repairable after a torn write.

pub mod jsonl;

pub use jsonl::{JsonlHistory, StoreError};
