//! Crate-level error types
//!
//! The context core itself is total and raises nothing; errors only arise at
//! the edges — configuration loading, the completion endpoint, and the
//! terminal frontend.

use crate::completion::CompletionError;
use thiserror::Error;

/// Errors surfaced by the chat application around the context core.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("completion request failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
