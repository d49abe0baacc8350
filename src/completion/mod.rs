//! Completion-request collaborator
//!
//! Buffering happens first; this module takes the finished window and talks
//! to the endpoint.

pub mod client;
mod stream;

pub use client::{ChatCompletion, CompletionError, OpenAiClient};
