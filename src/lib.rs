//! Client-side chat context management
//!
//! A conversational chat client cannot send its full history to the
//! completion endpoint forever; this crate owns the policy that decides, on
//! every turn, which window of prior messages goes on the wire under a fixed
//! prompt-token budget.
//!
//! The core is [`context`]: a heuristic token estimator, two interchangeable
//! buffering policies (recency under a token budget, last-N user turns), and
//! the session object owning the full history. Around it sit the
//! [`completion`] client, layered [`config`], and [`logging`].

pub mod completion;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;

pub use completion::{ChatCompletion, CompletionError, OpenAiClient};
pub use config::{BufferPolicy, CompletionConfig, Config, ContextConfig, LoggingConfig};
pub use context::{
    build_buffered_messages, build_last_two_user_turns, count_message_tokens, estimate_tokens,
    ChatSession, ContextStrategy, Message, RecentTurnsStrategy, Role, SessionId,
    TokenBudgetStrategy, DEFAULT_SYSTEM_PROMPT,
};
pub use error::{ChatError, Result};
