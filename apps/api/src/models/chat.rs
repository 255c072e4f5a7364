use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::extraction::display_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Milliseconds since the Unix epoch; strictly increasing within a history.
    pub timestamp: i64,
}

impl ChatMessage {
    /// Transcript text for the chat bubble, with data blocks and `**` removed.
    pub fn display(&self) -> String {
        display_text(&self.content)
    }
}

/// Append-only conversation transcript. Messages are never edited or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message stamped with the current time, bumped past the last
    /// message's stamp if the clock has not moved (or moved backwards).
    pub fn push(&mut self, role: ChatRole, content: impl Into<String>) -> &ChatMessage {
        let now = Utc::now().timestamp_millis();
        let timestamp = match self.messages.last() {
            Some(last) if now <= last.timestamp => last.timestamp + 1,
            _ => now,
        };

        self.messages.push(ChatMessage {
            role,
            content: content.into(),
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut history = ChatHistory::new();
        for i in 0..50 {
            history.push(ChatRole::User, format!("message {i}"));
        }
        let stamps: Vec<i64> = history.messages().iter().map(|m| m.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_push_preserves_order_and_content() {
        let mut history = ChatHistory::new();
        history.push(ChatRole::User, "I'm a backend engineer");
        history.push(ChatRole::Assistant, "Great!");
        let messages = history.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].content, "Great!");
    }

    #[test]
    fn test_history_serializes_as_plain_array() {
        let mut history = ChatHistory::new();
        history.push(ChatRole::Assistant, "Hello");
        let value = serde_json::to_value(&history).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["role"], "assistant");
        assert!(value[0]["timestamp"].is_i64());
    }

    #[test]
    fn test_display_hides_data_block() {
        let message = ChatMessage {
            role: ChatRole::Assistant,
            content: "**Nice!**\n<!--RESUME_DATA {\"skills\":[\"Rust\"]} RESUME_DATA-->".to_string(),
            timestamp: 1,
        };
        assert_eq!(message.display(), "Nice!");
    }
}
