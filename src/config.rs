//! Application configuration
//!
//! Layered the usual way: optional `config.toml`, then `CHAT_`-prefixed
//! environment variables, with `.env` loaded first so local development can
//! keep the API key out of the shell profile.

use crate::context::{
    ContextStrategy, RecentTurnsStrategy, TokenBudgetStrategy, DEFAULT_SYSTEM_PROMPT,
};
use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `config.toml` (if present) and the
    /// environment. `CHAT_CONTEXT__MAX_PROMPT_TOKENS=2000` style variables
    /// override file values.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("CHAT").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ChatError::Configuration(e.to_string()))
    }
}

/// Which buffering policy reduces history before each completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Recency window under the prompt-token budget
    TokenBudget,
    /// Last N user turns, token cost unbounded
    RecentTurns,
}

/// Context-window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Buffering policy applied each turn
    #[serde(default = "default_policy")]
    pub policy: BufferPolicy,

    /// Prompt-token budget for the token-budget policy. This bounds the
    /// input prompt, not the model's output.
    #[serde(default = "default_max_prompt_tokens")]
    pub max_prompt_tokens: usize,

    /// User-turn count for the recent-turns policy
    #[serde(default = "default_recent_user_turns")]
    pub recent_user_turns: usize,

    /// System prompt seeded at session start and synthesized when a history
    /// carries no system message
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_policy() -> BufferPolicy {
    BufferPolicy::TokenBudget
}

fn default_max_prompt_tokens() -> usize {
    900
}

fn default_recent_user_turns() -> usize {
    2
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            max_prompt_tokens: default_max_prompt_tokens(),
            recent_user_turns: default_recent_user_turns(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl ContextConfig {
    /// Build the configured reduction strategy.
    pub fn strategy(&self) -> Arc<dyn ContextStrategy> {
        match self.policy {
            BufferPolicy::TokenBudget => Arc::new(
                TokenBudgetStrategy::new(self.max_prompt_tokens)
                    .with_system_prompt(self.system_prompt.clone()),
            ),
            BufferPolicy::RecentTurns => Arc::new(
                RecentTurnsStrategy::new(self.recent_user_turns)
                    .with_system_prompt(self.system_prompt.clone()),
            ),
        }
    }
}

/// Completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// OpenAI-compatible chat-completions URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry attempts for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on generated tokens, when set
    #[serde(default)]
    pub max_tokens: Option<usize>,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON instead of human-readable lines
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
