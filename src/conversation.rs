//! Append-only conversation store

use crate::events::{Message, Role};
use chrono::{DateTime, Local};

pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// A stored message together with the moment it entered the conversation
#[derive(Debug, Clone)]
pub struct Turn {
    pub message: Message,
    pub at: DateTime<Local>,
}

/// Ordered message sequence. Grows by append only.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a conversation seeded with the assistant greeting
    pub fn new(greeting: impl Into<String>) -> Self {
        let mut conversation = Self { turns: Vec::new() };
        conversation.push(Message::assistant(greeting));
        conversation
    }

    /// Append a user message; blank text is a no-op
    pub fn push_user(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.push(Message::user(text));
        true
    }

    /// Append a message received from the completion endpoint, verbatim
    pub fn push_assistant(&mut self, message: Message) {
        self.push(message);
    }

    fn push(&mut self, message: Message) {
        self.turns.push(Turn {
            message,
            at: Local::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.turns.iter().map(|turn| &turn.message)
    }

    /// Snapshot of the messages in order, ready to be sent
    pub fn to_messages(&self) -> Vec<Message> {
        self.messages().cloned().collect()
    }

    /// The n-th most recent assistant message (1 = latest)
    pub fn nth_latest_assistant(&self, n: usize) -> Option<&Message> {
        if n == 0 {
            return None;
        }
        self.messages()
            .rev()
            .filter(|message| message.role == Role::Assistant)
            .nth(n - 1)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_holds_only_greeting() {
        let conversation = Conversation::default();
        assert_eq!(conversation.to_messages(), vec![Message::assistant(DEFAULT_GREETING)]);
    }

    #[test]
    fn test_blank_user_text_is_ignored() {
        let mut conversation = Conversation::default();
        assert!(!conversation.push_user(""));
        assert!(!conversation.push_user("  \n\t "));
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_user_text_is_stored_untrimmed() {
        let mut conversation = Conversation::default();
        assert!(conversation.push_user("  hi there \n"));
        assert_eq!(conversation.to_messages()[1], Message::user("  hi there \n"));
    }

    #[test]
    fn test_nth_latest_assistant_skips_user_messages() {
        let mut conversation = Conversation::new("greeting");
        conversation.push_user("one");
        conversation.push_assistant(Message::assistant("first reply"));
        conversation.push_user("two");

        assert_eq!(conversation.nth_latest_assistant(1).unwrap().content, "first reply");
        assert_eq!(conversation.nth_latest_assistant(2).unwrap().content, "greeting");
        assert!(conversation.nth_latest_assistant(3).is_none());
        assert!(conversation.nth_latest_assistant(0).is_none());
    }
}
