//! NovaChat: a terminal chat client for OpenAI-compatible completion endpoints.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod llm;
pub mod session;
pub mod tui;
pub mod ui;

pub use config::Config;
pub use conversation::Conversation;
pub use error::CompletionError;
pub use events::{Message, Role};
pub use llm::{Completer, LlmClient};
pub use session::{ChatSession, SendState, Submission};
