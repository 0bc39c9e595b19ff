// ABOUTME: Read-only boundary to the externally owned conversation history.
// ABOUTME: The engine reads recent entries for planner context and never writes to the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchboard_gateway::Role;

/// One line of the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

pub trait ConversationHistory: Send + Sync {
    /// Up to `limit` most recent entries, oldest first.
    fn recent(&self, limit: usize) -> Vec<ConversationEntry>;
}

/// History backed by a fixed list, for callers that keep entries in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    entries: Vec<ConversationEntry>,
}

impl StaticHistory {
    pub fn new(entries: Vec<ConversationEntry>) -> Self {
        Self { entries }
    }
}

impl ConversationHistory for StaticHistory {
    fn recent(&self, limit: usize) -> Vec<ConversationEntry> {
        let start = self.entries.len().saturating_sub(limit);
        self.entries[start..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_returns_tail_in_order() {
        let history = StaticHistory::new(vec![
            ConversationEntry::new(Role::User, "one"),
            ConversationEntry::new(Role::Assistant, "two"),
            ConversationEntry::new(Role::User, "three"),
        ]);

        let recent = history.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "two");
        assert_eq!(recent[1].content, "three");
        assert_eq!(history.recent(10).len(), 3);
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn entry_serializes_role_lowercase() {
        let entry = ConversationEntry::new(Role::Assistant, "hi");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["role"], "assistant");
        assert!(value["timestamp"].is_string());
    }
}
