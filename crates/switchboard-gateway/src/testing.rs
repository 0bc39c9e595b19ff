// ABOUTME: Test utilities for the gateway, including a scripted, call-recording gateway.
// ABOUTME: Used in tests across the workspace to drive orchestration without real API calls.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::gateway::{GatewayError, GenerationGateway, Message, Shape};

/// Which gateway operation a call used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Text,
    Structured,
}

/// A call observed by [`ScriptedGateway`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub system: String,
    pub messages: Vec<Message>,
    pub shape: Option<Shape>,
}

impl RecordedCall {
    /// The system prompt and every message body joined together.
    pub fn haystack(&self) -> String {
        let mut text = self.system.clone();
        for msg in &self.messages {
            text.push('\n');
            text.push_str(&msg.content);
        }
        text
    }
}

enum Reply {
    Text(String),
    Structured(Value),
    Fail(GatewayError),
}

struct Rule {
    kind: CallKind,
    needle: String,
    reply: Reply,
    delay: Duration,
    remaining: Option<usize>,
}

/// A fake gateway answering from an ordered list of rules.
///
/// A rule matches when its needle occurs in the system prompt or any message
/// of a call of the same kind; the empty needle matches everything. The first
/// matching rule with uses left wins. Calls with no matching rule fail with a
/// provider error naming the call.
#[derive(Default)]
pub struct ScriptedGateway {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, rule: Rule) -> Self {
        self.rules
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(rule);
        self
    }

    fn rule(kind: CallKind, needle: &str, reply: Reply) -> Rule {
        Rule {
            kind,
            needle: needle.to_owned(),
            reply,
            delay: Duration::ZERO,
            remaining: None,
        }
    }

    /// Answer text calls containing `needle` with `text`.
    pub fn text_when(self, needle: &str, text: &str) -> Self {
        self.push(Self::rule(CallKind::Text, needle, Reply::Text(text.to_owned())))
    }

    /// Like [`Self::text_when`], but the reply arrives after `delay`.
    pub fn text_when_delayed(self, needle: &str, text: &str, delay: Duration) -> Self {
        let mut rule = Self::rule(CallKind::Text, needle, Reply::Text(text.to_owned()));
        rule.delay = delay;
        self.push(rule)
    }

    /// Answer structured calls containing `needle` with `value`.
    pub fn structured_when(self, needle: &str, value: Value) -> Self {
        self.push(Self::rule(CallKind::Structured, needle, Reply::Structured(value)))
    }

    /// Like [`Self::structured_when`], but the reply arrives after `delay`.
    pub fn structured_when_delayed(self, needle: &str, value: Value, delay: Duration) -> Self {
        let mut rule = Self::rule(CallKind::Structured, needle, Reply::Structured(value));
        rule.delay = delay;
        self.push(rule)
    }

    /// Fail text calls containing `needle`.
    pub fn fail_text_when(self, needle: &str, error: GatewayError) -> Self {
        self.push(Self::rule(CallKind::Text, needle, Reply::Fail(error)))
    }

    /// Fail structured calls containing `needle`.
    pub fn fail_structured_when(self, needle: &str, error: GatewayError) -> Self {
        self.push(Self::rule(CallKind::Structured, needle, Reply::Fail(error)))
    }

    /// Fail the next `times` text calls, whatever they contain.
    pub fn fail_text_times(self, times: usize, error: GatewayError) -> Self {
        let mut rule = Self::rule(CallKind::Text, "", Reply::Fail(error));
        rule.remaining = Some(times);
        self.push(rule)
    }

    /// Every call seen so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of calls whose system prompt or messages contain `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.haystack().contains(needle))
            .count()
    }

    fn answer(&self, call: RecordedCall) -> (Result<Reply, GatewayError>, Duration) {
        let haystack = call.haystack();
        let kind = call.kind;
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);

        let mut rules = self.rules.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let matched = rules.iter_mut().find(|rule| {
            rule.kind == kind && rule.remaining != Some(0) && haystack.contains(&rule.needle)
        });

        match matched {
            Some(rule) => {
                if let Some(remaining) = rule.remaining.as_mut() {
                    *remaining -= 1;
                }
                let reply = match &rule.reply {
                    Reply::Text(text) => Reply::Text(text.clone()),
                    Reply::Structured(value) => Reply::Structured(value.clone()),
                    Reply::Fail(error) => Reply::Fail(error.clone()),
                };
                (Ok(reply), rule.delay)
            }
            None => {
                let preview: String = haystack.chars().take(80).collect();
                (
                    Err(GatewayError::ProviderError(format!(
                        "no scripted {:?} response for: {}",
                        kind, preview
                    ))),
                    Duration::ZERO,
                )
            }
        }
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate_text(
        &self,
        system: &str,
        messages: &[Message],
    ) -> Result<String, GatewayError> {
        let (reply, delay) = self.answer(RecordedCall {
            kind: CallKind::Text,
            system: system.to_owned(),
            messages: messages.to_vec(),
            shape: None,
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply? {
            Reply::Text(text) => Ok(text),
            Reply::Fail(error) => Err(error),
            Reply::Structured(value) => Ok(value.to_string()),
        }
    }

    async fn generate_structured(
        &self,
        system: &str,
        messages: &[Message],
        shape: &Shape,
    ) -> Result<Value, GatewayError> {
        let (reply, delay) = self.answer(RecordedCall {
            kind: CallKind::Structured,
            system: system.to_owned(),
            messages: messages.to_vec(),
            shape: Some(shape.clone()),
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let value = match reply? {
            Reply::Structured(value) => value,
            Reply::Fail(error) => return Err(error),
            Reply::Text(text) => Value::String(text),
        };
        crate::providers::ensure_conforms(value, shape)
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn first_matching_rule_wins() {
        let gateway = ScriptedGateway::new()
            .text_when("weather", "Sunny")
            .text_when("", "Fallback");

        let sunny = gateway
            .generate_text("You are a weather expert.", &[])
            .await
            .unwrap();
        let other = gateway
            .generate_text("You are a synthesis agent.", &[])
            .await
            .unwrap();

        assert_eq!(sunny, "Sunny");
        assert_eq!(other, "Fallback");
    }

    #[tokio::test]
    async fn needle_matches_message_content() {
        let gateway = ScriptedGateway::new().text_when("Paris", "Found it");
        let text = gateway
            .generate_text("sys", &[Message::user("Weather in Paris?")])
            .await
            .unwrap();
        assert_eq!(text, "Found it");
    }

    #[tokio::test]
    async fn unmatched_call_fails_and_is_recorded() {
        let gateway = ScriptedGateway::new();
        let err = gateway.generate_text("sys", &[]).await.unwrap_err();

        assert!(err.to_string().contains("no scripted"));
        assert_eq!(gateway.calls().len(), 1);
        assert_eq!(gateway.calls()[0].kind, CallKind::Text);
    }

    #[tokio::test]
    async fn limited_rules_run_out() {
        let gateway = ScriptedGateway::new()
            .fail_text_times(1, GatewayError::ProviderError("503".to_string()))
            .text_when("", "ok");

        assert!(gateway.generate_text("sys", &[]).await.is_err());
        assert_eq!(gateway.generate_text("sys", &[]).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn structured_replies_are_checked_against_shape() {
        let shape = Shape::new(
            "answer",
            "an answer",
            json!({"type": "object", "required": ["answer"]}),
        );
        let gateway = ScriptedGateway::new()
            .structured_when("good", json!({"answer": "42"}))
            .structured_when("bad", json!({"nope": true}));

        let good = gateway
            .generate_structured("good", &[], &shape)
            .await
            .unwrap();
        assert_eq!(good["answer"], "42");

        let bad = gateway.generate_structured("bad", &[], &shape).await;
        assert!(matches!(bad, Err(GatewayError::MalformedOutput(_))));
    }

    #[tokio::test]
    async fn count_matching_counts_recorded_calls() {
        let gateway = ScriptedGateway::new().text_when("", "x");
        gateway.generate_text("alpha", &[]).await.unwrap();
        gateway.generate_text("beta", &[]).await.unwrap();
        gateway
            .generate_text("gamma", &[Message::user("alpha again")])
            .await
            .unwrap();

        assert_eq!(gateway.count_matching("alpha"), 2);
        assert_eq!(gateway.count_matching("delta"), 0);
    }
}
