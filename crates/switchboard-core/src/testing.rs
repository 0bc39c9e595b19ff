// ABOUTME: Test helpers for core types, chiefly a configurable capability that counts its calls.
// ABOUTME: Shared by engine and server tests to assert which capabilities ran and with what arguments.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::capability::{Capability, CapabilityError};

/// A capability returning a fixed output (or error) and recording every call.
///
/// Clones share the call log, so a test can keep one handle while the
/// registry owns another.
#[derive(Clone)]
pub struct MockCapability {
    name: String,
    output: Result<Value, CapabilityError>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    args: Arc<Mutex<Vec<Value>>>,
}

impl MockCapability {
    pub fn new(name: &str, output: Value) -> Self {
        Self {
            name: name.to_string(),
            output: Ok(output),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            args: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A capability whose every call fails with `CapabilityError::Failed(message)`.
    pub fn failing(name: &str, message: &str) -> Self {
        let mut capability = Self::new(name, Value::Null);
        capability.output = Err(CapabilityError::Failed(message.to_string()));
        capability
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of every call, in order.
    pub fn received(&self) -> Vec<Value> {
        self.args
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Capability for MockCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Mock capability for tests"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "input": {"type": "string", "description": "Free-form input"}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.args
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(args);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.output.clone()
    }
}
