// ABOUTME: Gateway wrappers that add a per-call timeout and retries of transient failures.
// ABOUTME: Retry policy lives here so the orchestrator itself never retries a generation call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::gateway::{GatewayError, GenerationGateway, Message, Shape};

/// Fails any call that takes longer than `timeout` with [`GatewayError::Timeout`].
pub struct TimeoutGateway {
    inner: Arc<dyn GenerationGateway>,
    timeout: Duration,
}

impl TimeoutGateway {
    pub fn new(inner: Arc<dyn GenerationGateway>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl GenerationGateway for TimeoutGateway {
    async fn generate_text(
        &self,
        system: &str,
        messages: &[Message],
    ) -> Result<String, GatewayError> {
        tokio::time::timeout(self.timeout, self.inner.generate_text(system, messages))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
    }

    async fn generate_structured(
        &self,
        system: &str,
        messages: &[Message],
        shape: &Shape,
    ) -> Result<Value, GatewayError> {
        tokio::time::timeout(
            self.timeout,
            self.inner.generate_structured(system, messages, shape),
        )
        .await
        .map_err(|_| GatewayError::Timeout(self.timeout))?
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Retries transient failures (see [`GatewayError::is_transient`]) up to
/// `max_retries` extra attempts, doubling the delay after each one.
pub struct RetryingGateway {
    inner: Arc<dyn GenerationGateway>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingGateway {
    pub fn new(inner: Arc<dyn GenerationGateway>, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            base_delay: Duration::from_millis(500),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Whether another attempt should follow `error` on attempt number `attempt`.
    fn should_retry(&self, error: &GatewayError, attempt: u32) -> bool {
        error.is_transient() && attempt < self.max_retries
    }
}

#[async_trait]
impl GenerationGateway for RetryingGateway {
    async fn generate_text(
        &self,
        system: &str,
        messages: &[Message],
    ) -> Result<String, GatewayError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate_text(system, messages).await {
                Err(e) if self.should_retry(&e, attempt) => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(error = %e, attempt = attempt + 1, ?delay, "retrying text generation");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn generate_structured(
        &self,
        system: &str,
        messages: &[Message],
        shape: &Shape,
    ) -> Result<Value, GatewayError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate_structured(system, messages, shape).await {
                Err(e) if self.should_retry(&e, attempt) => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        error = %e,
                        shape = %shape.name,
                        attempt = attempt + 1,
                        ?delay,
                        "retrying structured generation"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
