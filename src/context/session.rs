//! Conversation session owning the full message history
//!
//! The full history lives here and nowhere else: created at session start,
//! appended each turn, dropped at session end. Buffering policies only ever
//! see it as a borrowed slice, so deriving the reduced window never mutates
//! what the session holds.

use super::models::Message;
use super::window::ContextStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single conversation: the append-only full history plus the active
/// context-reduction strategy.
///
/// One session is driven by one logical thread of control; a turn appends the
/// user message, derives the reduced context, and appends the reply. The
/// strategies themselves are pure, so independent sessions can run in
/// parallel freely.
pub struct ChatSession {
    id: SessionId,
    messages: Vec<Message>,
    strategy: Arc<dyn ContextStrategy>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create an empty session with the given reduction strategy.
    pub fn new(strategy: Arc<dyn ContextStrategy>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            messages: Vec::new(),
            strategy,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a session seeded with a system message, the way the chat
    /// frontend starts every conversation.
    pub fn with_system(strategy: Arc<dyn ContextStrategy>, prompt: impl Into<String>) -> Self {
        let mut session = Self::new(strategy);
        session.push(Message::system(prompt));
        session
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a user message to the full history.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Append an assistant reply to the full history.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// The full, unreduced history.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Apply the active strategy to the full history, yielding the message
    /// window to send with the next completion request.
    pub fn context(&self) -> Vec<Message> {
        self.strategy.reduce(&self.messages)
    }
}
