//! Context-reduction strategies
//!
//! Full conversation history grows without bound, so each turn only a reduced
//! window of it is sent to the completion endpoint. The two policies here are
//! interchangeable behind [`ContextStrategy`]:
//!
//! - [`TokenBudgetStrategy`]: keep the system message plus the longest suffix
//!   of recent messages that fits a prompt-token budget.
//! - [`RecentTurnsStrategy`]: keep the system message plus the last N user
//!   turns and their replies, regardless of token cost.
//!
//! Both are pure over a borrowed history slice and never mutate it.

use super::models::{Message, DEFAULT_SYSTEM_PROMPT};
use super::token_estimator::{count_message_tokens, estimate_tokens, MESSAGE_OVERHEAD_TOKENS};
use tracing::debug;

/// A policy that reduces full conversation history to the message window
/// actually sent with a completion request.
pub trait ContextStrategy: Send + Sync {
    /// Derive the reduced window from the full history.
    ///
    /// The output preserves the relative order of the input and, when
    /// non-empty, starts with exactly one system message: the first one found
    /// in the history, or a synthesized default.
    fn reduce(&self, history: &[Message]) -> Vec<Message>;
}

/// Split the history into its anchoring system message and everything else.
///
/// Only the first system-role message anchors the window; any later system
/// messages are treated as ordinary history. When none exists, the fallback
/// prompt is synthesized in its place.
fn split_system(history: &[Message], fallback_prompt: &str) -> (Message, Vec<Message>) {
    let mut system_msg = None;
    let mut rest = Vec::with_capacity(history.len());

    for m in history {
        if m.is_system() && system_msg.is_none() {
            system_msg = Some(m.clone());
        } else {
            rest.push(m.clone());
        }
    }

    let system_msg = system_msg.unwrap_or_else(|| Message::system(fallback_prompt));
    (system_msg, rest)
}

/// Recency window under a fixed prompt-token budget.
///
/// Scans the non-system history from newest to oldest, accepting messages
/// while the estimated cost of `[system] + accepted` stays within budget, and
/// stops at the first message that does not fit. Older messages are never
/// considered past that point, so the kept window is always a contiguous
/// suffix. A single oversized message near the boundary can therefore leave
/// budget unused; that is the intended recency bias, not best-effort packing.
#[derive(Debug, Clone)]
pub struct TokenBudgetStrategy {
    max_prompt_tokens: usize,
    system_prompt: String,
}

impl TokenBudgetStrategy {
    /// Create a strategy with the given prompt-token budget.
    ///
    /// Any budget is accepted; one too small to fit more than the system
    /// message simply yields the system message alone.
    pub fn new(max_prompt_tokens: usize) -> Self {
        Self {
            max_prompt_tokens,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Override the prompt synthesized when the history has no system message.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn max_prompt_tokens(&self) -> usize {
        self.max_prompt_tokens
    }
}

impl ContextStrategy for TokenBudgetStrategy {
    fn reduce(&self, history: &[Message]) -> Vec<Message> {
        if history.is_empty() {
            return Vec::new();
        }

        let (system_msg, rest) = split_system(history, &self.system_prompt);

        // Single reverse scan with a running total instead of re-counting a
        // trial list per candidate. cost(m) = overhead + estimate(content),
        // so the running total always equals count_message_tokens of the
        // would-be window.
        let mut total = count_message_tokens(std::slice::from_ref(&system_msg));
        let mut start = rest.len();

        for (idx, m) in rest.iter().enumerate().rev() {
            let cost = MESSAGE_OVERHEAD_TOKENS + estimate_tokens(&m.content);
            if total + cost > self.max_prompt_tokens {
                // Hard stop: the window stays contiguous even if an older,
                // smaller message would still fit.
                break;
            }
            total += cost;
            start = idx;
        }

        debug!(
            kept = rest.len() - start,
            dropped = start,
            estimated_tokens = total,
            budget = self.max_prompt_tokens,
            "reduced history to token-budgeted window"
        );

        let mut window = Vec::with_capacity(rest.len() - start + 1);
        window.push(system_msg);
        window.extend(rest.into_iter().skip(start));
        window
    }
}

/// Turn-aligned window: the last N user turns and everything after them.
///
/// Unlike the token-budgeted window this guarantees a fixed amount of recent
/// dialogue structure at an unbounded token cost.
#[derive(Debug, Clone)]
pub struct RecentTurnsStrategy {
    turns: usize,
    system_prompt: String,
}

impl RecentTurnsStrategy {
    /// Keep the last `turns` user messages and their interleaved replies.
    pub fn new(turns: usize) -> Self {
        Self {
            turns,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Override the prompt synthesized when the history has no system message.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn turns(&self) -> usize {
        self.turns
    }
}

impl ContextStrategy for RecentTurnsStrategy {
    fn reduce(&self, history: &[Message]) -> Vec<Message> {
        let (system_msg, convo) = split_system(history, &self.system_prompt);

        let user_indices: Vec<usize> = convo
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_user())
            .map(|(i, _)| i)
            .collect();

        let mut window = Vec::with_capacity(convo.len() + 1);
        window.push(system_msg);

        // Zero turns keeps nothing beyond the system message.
        if self.turns == 0 {
            return window;
        }

        if user_indices.len() <= self.turns {
            window.extend(convo);
            return window;
        }

        // Everything from the Nth-from-last user message onward, assistant
        // interleavings included.
        let start = user_indices[user_indices.len() - self.turns];
        debug!(
            kept = convo.len() - start,
            dropped = start,
            turns = self.turns,
            "reduced history to recent-turns window"
        );
        window.extend(convo.into_iter().skip(start));
        window
    }
}

/// Build the token-budgeted window with the default system prompt.
///
/// Convenience over [`TokenBudgetStrategy`] for callers that do not carry a
/// configured strategy around.
pub fn build_buffered_messages(full_messages: &[Message], max_prompt_tokens: usize) -> Vec<Message> {
    TokenBudgetStrategy::new(max_prompt_tokens).reduce(full_messages)
}

/// Build the last-two-user-turns window with the default system prompt.
pub fn build_last_two_user_turns(full_messages: &[Message]) -> Vec<Message> {
    RecentTurnsStrategy::new(2).reduce(full_messages)
}
