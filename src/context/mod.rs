//! Token-budgeted context window management
//!
//! Full conversation history cannot be sent to the completion endpoint
//! forever, so every turn a buffering policy derives the reduced message
//! window that actually goes on the wire.

pub mod models;
pub mod session;
pub mod token_estimator;
pub mod window;

pub use models::{Message, Role, DEFAULT_SYSTEM_PROMPT};
pub use session::{ChatSession, SessionId};
pub use token_estimator::{
    count_message_tokens, estimate_tokens, CHARS_PER_TOKEN, MESSAGE_OVERHEAD_TOKENS,
};
pub use window::{
    build_buffered_messages, build_last_two_user_turns, ContextStrategy, RecentTurnsStrategy,
    TokenBudgetStrategy,
};
