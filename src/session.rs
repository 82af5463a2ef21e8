use crate::conversation::{Conversation, DEFAULT_GREETING};
use crate::error::CompletionError;
use crate::events::Message;
use crate::llm::Completer;
use log::{debug, error, info, warn};

/// Where the send cycle currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
    /// The last request failed; holds the reason shown to the user
    Failed(String),
}

/// Result of asking the session to send its pending input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Input was blank; nothing changed
    Ignored,
    /// A request is already in flight; the pending input is kept
    Rejected,
    /// The user message was appended; these messages must be sent
    Started(Vec<Message>),
}

/// One chat session: the conversation, the input buffer and the send state
#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation: Conversation,
    pending_input: String,
    state: SendState,
}

impl ChatSession {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::new(greeting),
            pending_input: String::new(),
            state: SendState::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> &SendState {
        &self.state
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.state == SendState::Sending
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Start a send cycle from the pending input
    pub fn submit(&mut self) -> Submission {
        if self.pending_input.trim().is_empty() {
            return Submission::Ignored;
        }

        if self.is_request_in_flight() {
            debug!("submit rejected: a request is already in flight");
            return Submission::Rejected;
        }

        let text = std::mem::take(&mut self.pending_input);
        self.conversation.push_user(&text);
        self.state = SendState::Sending;
        info!("sending conversation of {} messages", self.conversation.len());

        Submission::Started(self.conversation.to_messages())
    }

    /// Set the pending input and submit it in one step
    pub fn submit_text(&mut self, text: impl Into<String>) -> Submission {
        if self.is_request_in_flight() {
            debug!("submit rejected: a request is already in flight");
            return Submission::Rejected;
        }
        self.pending_input = text.into();
        self.submit()
    }

    /// Apply the outcome of the in-flight request
    pub fn resolve(&mut self, outcome: Result<Message, CompletionError>) {
        if !self.is_request_in_flight() {
            warn!("completion outcome arrived with no request in flight; dropped");
            return;
        }

        match outcome {
            Ok(message) => {
                debug!("assistant replied with {} chars", message.content.len());
                self.conversation.push_assistant(message);
                self.state = SendState::Idle;
            }
            Err(e) => {
                error!("completion request failed: {}", e);
                self.state = SendState::Failed(e.to_string());
            }
        }
    }

    /// Run a full cycle: submit, await the completer, resolve
    pub async fn send<C: Completer>(&mut self, completer: &C, text: impl Into<String>) -> Submission {
        let submission = self.submit_text(text);
        if let Submission::Started(messages) = &submission {
            let outcome = completer.complete(messages.clone()).await;
            self.resolve(outcome);
        }
        submission
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Role;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Completer that replays canned outcomes and records what it was sent
    #[derive(Clone, Default)]
    struct ScriptedCompleter {
        replies: Arc<Mutex<VecDeque<Result<Message, CompletionError>>>>,
        seen: Arc<Mutex<Vec<Vec<Message>>>>,
    }

    impl ScriptedCompleter {
        fn reply(self, outcome: Result<Message, CompletionError>) -> Self {
            self.replies.lock().unwrap().push_back(outcome);
            self
        }
    }

    impl Completer for ScriptedCompleter {
        async fn complete(&self, messages: Vec<Message>) -> Result<Message, CompletionError> {
            self.seen.lock().unwrap().push(messages);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::protocol("script exhausted")))
        }
    }

    #[test]
    fn test_fresh_session() {
        let session = ChatSession::default();
        assert_eq!(
            session.conversation().to_messages(),
            vec![Message::assistant(DEFAULT_GREETING)]
        );
        assert_eq!(session.state(), &SendState::Idle);
        assert!(!session.is_request_in_flight());
    }

    #[test]
    fn test_hi_round_trip() {
        let mut session = ChatSession::default();
        session.set_pending_input("Hi");

        let submission = session.submit();
        let expected = vec![Message::assistant(DEFAULT_GREETING), Message::user("Hi")];
        assert_eq!(submission, Submission::Started(expected.clone()));
        assert_eq!(session.conversation().to_messages(), expected);
        assert_eq!(session.pending_input(), "");
        assert!(session.is_request_in_flight());

        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hi there!"}}]}"#;
        session.resolve(crate::llm::decode_completion(body));

        assert_eq!(
            session.conversation().to_messages(),
            vec![
                Message::assistant(DEFAULT_GREETING),
                Message::user("Hi"),
                Message::assistant("Hi there!"),
            ]
        );
        assert!(!session.is_request_in_flight());
        assert_eq!(session.state(), &SendState::Idle);
    }

    #[test]
    fn test_missing_choices_leaves_user_message_only() {
        let mut session = ChatSession::default();
        session.set_pending_input("Hi");
        session.submit();

        let outcome = crate::llm::decode_completion("{}");
        assert!(outcome.as_ref().unwrap_err().is_protocol());
        session.resolve(outcome);

        assert_eq!(
            session.conversation().to_messages(),
            vec![Message::assistant(DEFAULT_GREETING), Message::user("Hi")]
        );
        assert!(!session.is_request_in_flight());
        assert!(matches!(session.state(), SendState::Failed(_)));
    }

    #[test]
    fn test_network_failure_leaves_user_message_only() {
        let mut session = ChatSession::default();
        session.submit_text("Hi");
        session.resolve(Err(CompletionError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        }));

        assert_eq!(session.conversation().len(), 2);
        match session.state() {
            SendState::Failed(reason) => assert!(reason.contains("502")),
            other => panic!("expected failed state, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut session = ChatSession::default();
        for blank in ["", " ", "\n\t  \n"] {
            session.set_pending_input(blank);
            assert_eq!(session.submit(), Submission::Ignored);
            assert_eq!(session.conversation().len(), 1);
            assert_eq!(session.state(), &SendState::Idle);
        }
    }

    #[test]
    fn test_blank_input_during_failed_keeps_failed_state() {
        let mut session = ChatSession::default();
        session.submit_text("Hi");
        session.resolve(Err(CompletionError::MissingApiKey));

        assert_eq!(session.submit_text("   "), Submission::Ignored);
        assert!(matches!(session.state(), SendState::Failed(_)));
    }

    #[test]
    fn test_submit_while_sending_is_rejected() {
        let mut session = ChatSession::default();
        session.submit_text("first");

        session.set_pending_input("second");
        assert_eq!(session.submit(), Submission::Rejected);
        assert_eq!(session.pending_input(), "second");
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.submit_text("third"), Submission::Rejected);
        assert_eq!(session.pending_input(), "second");
    }

    #[test]
    fn test_flag_lifecycle_for_both_outcomes() {
        let mut session = ChatSession::default();
        assert!(!session.is_request_in_flight());

        session.submit_text("ok");
        assert!(session.is_request_in_flight());
        session.resolve(Ok(Message::assistant("fine")));
        assert!(!session.is_request_in_flight());

        session.submit_text("fail");
        assert!(session.is_request_in_flight());
        session.resolve(Err(CompletionError::protocol("bad shape")));
        assert!(!session.is_request_in_flight());
    }

    #[test]
    fn test_failed_session_can_send_again() {
        let mut session = ChatSession::default();
        session.submit_text("one");
        session.resolve(Err(CompletionError::MissingApiKey));

        assert!(matches!(session.submit_text("two"), Submission::Started(_)));
        session.resolve(Ok(Message::assistant("reply")));

        let roles: Vec<Role> = session.conversation().messages().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::User, Role::Assistant]);
        assert_eq!(session.state(), &SendState::Idle);
    }

    #[test]
    fn test_resolve_without_request_is_dropped() {
        let mut session = ChatSession::default();
        session.resolve(Ok(Message::assistant("stray")));
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.state(), &SendState::Idle);
    }

    #[tokio::test]
    async fn test_n_round_trips_alternate() {
        let mut completer = ScriptedCompleter::default();
        for i in 0..4 {
            completer = completer.reply(Ok(Message::assistant(format!("reply {}", i))));
        }

        let mut session = ChatSession::default();
        for i in 0..4 {
            let submission = session.send(&completer, format!("question {}", i)).await;
            assert!(matches!(submission, Submission::Started(_)));
            assert_eq!(session.conversation().len(), 1 + 2 * (i + 1));
        }

        let roles: Vec<Role> = session.conversation().messages().skip(1).map(|m| m.role).collect();
        for (i, role) in roles.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(*role, expected);
        }
    }

    #[tokio::test]
    async fn test_send_passes_full_conversation() {
        let completer = ScriptedCompleter::default()
            .reply(Ok(Message::assistant("Hi there!")))
            .reply(Ok(Message::assistant("Sure.")));

        let mut session = ChatSession::default();
        session.send(&completer, "Hi").await;
        session.send(&completer, "Help me").await;

        let seen = completer.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].len(), 2);
        assert_eq!(seen[1].len(), 4);
        assert_eq!(seen[1][2], Message::assistant("Hi there!"));
        assert_eq!(seen[1][3], Message::user("Help me"));
    }

    #[tokio::test]
    async fn test_send_blank_never_calls_completer() {
        let completer = ScriptedCompleter::default();
        let mut session = ChatSession::default();
        assert_eq!(session.send(&completer, "  ").await, Submission::Ignored);
        assert!(completer.seen.lock().unwrap().is_empty());
    }
}
