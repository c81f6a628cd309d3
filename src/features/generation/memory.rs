//! Per-agent conversation memory

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only log of one agent's exchanges.
///
/// Never shared between agents; the debate history is the only channel
/// between the two sides.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Vec<MemoryMessage>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(MemoryMessage {
            role: Role::User,
            content: text.into(),
        });
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(MemoryMessage {
            role: Role::Assistant,
            content: text.into(),
        });
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn snapshot(&self) -> Vec<MemoryMessage> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order_and_roles() {
        let mut memory = ConversationMemory::new();
        memory.append_user("question");
        memory.append_assistant("answer");

        let snapshot = memory.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].role, Role::User);
        assert_eq!(snapshot[0].content, "question");
        assert_eq!(snapshot[1].role.as_str(), "assistant");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut memory = ConversationMemory::new();
        memory.clear();
        assert!(memory.snapshot().is_empty());

        memory.append_user("hello");
        memory.clear();
        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.snapshot(), Vec::new());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut memory = ConversationMemory::new();
        memory.append_user("one");
        let snapshot = memory.snapshot();
        memory.append_assistant("two");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(memory.len(), 2);
    }
}
