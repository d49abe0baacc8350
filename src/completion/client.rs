//! Chat-completion client for OpenAI-compatible endpoints
//!
//! The buffering policies hand this client a reduced message window; it owns
//! everything network-facing — auth, retries, timeouts, and streaming.

use super::stream::{extract_sse_frame, StreamChunk, DONE_FRAME};
use crate::config::CompletionConfig;
use crate::context::Message;
use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A chat-completion backend.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Request a completion for the given message window and return the
    /// assistant's full reply.
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError>;
}

/// Completion client errors.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("initialization error: {0}")]
    Initialization(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("stream error: {0}")]
    Stream(String),
}

/// Client for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiClient {
    client: Client,
    config: CompletionConfig,
    api_key: Option<SecretString>,
}

impl OpenAiClient {
    /// Create a client from configuration, resolving the API key from the
    /// configured environment variable. A missing key is not an error here;
    /// the request simply goes out unauthenticated (local endpoints).
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Initialization(e.to_string()))?;

        let api_key = std::env::var(&config.api_key_env).ok().map(SecretString::new);
        if api_key.is_none() {
            warn!(var = %config.api_key_env, "no API key in environment");
        }

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn request_body(&self, messages: &[Message], stream: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            stream,
        }
    }

    fn post(&self, body: &ChatCompletionRequest) -> reqwest::RequestBuilder {
        let mut req = self.client.post(&self.config.endpoint).json(body);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }
        req
    }

    /// Request a streamed completion and yield assistant content deltas as
    /// they arrive. Retries apply to establishing the response only; once
    /// frames are flowing, an error ends the stream.
    pub async fn complete_stream(
        &self,
        messages: &[Message],
    ) -> Result<impl Stream<Item = Result<String, CompletionError>> + Send, CompletionError> {
        let body = self.request_body(messages, true);
        let attempts = self.config.max_retries.max(1);
        let mut last_error = CompletionError::Network("request not attempted".to_string());

        for attempt in 0..attempts {
            if attempt > 0 {
                debug!(attempt, "retrying streamed completion");
                tokio::time::sleep(Duration::from_millis(100 * (1 << attempt))).await;
            }

            match self.post(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    let inner = Box::pin(response.bytes_stream());
                    return Ok(stream::unfold(
                        (inner, String::new(), false),
                        |(mut inner, mut buffer, done)| async move {
                            if done {
                                return None;
                            }
                            loop {
                                if let Some((frame, rest)) = extract_sse_frame(&buffer) {
                                    buffer = rest;
                                    if frame == DONE_FRAME {
                                        return None;
                                    }
                                    match serde_json::from_str::<StreamChunk>(&frame) {
                                        Ok(chunk) => {
                                            let delta = chunk
                                                .choices
                                                .into_iter()
                                                .next()
                                                .and_then(|c| c.delta.content);
                                            match delta {
                                                Some(text) if !text.is_empty() => {
                                                    return Some((
                                                        Ok(text),
                                                        (inner, buffer, false),
                                                    ));
                                                }
                                                // role-only or finish frame
                                                _ => continue,
                                            }
                                        }
                                        Err(e) => {
                                            return Some((
                                                Err(CompletionError::Stream(format!(
                                                    "malformed frame: {}",
                                                    e
                                                ))),
                                                (inner, buffer, true),
                                            ));
                                        }
                                    }
                                }

                                match inner.next().await {
                                    Some(Ok(bytes)) => {
                                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                                    }
                                    Some(Err(e)) => {
                                        return Some((
                                            Err(CompletionError::Network(e.to_string())),
                                            (inner, buffer, true),
                                        ));
                                    }
                                    None => return None,
                                }
                            }
                        },
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    last_error = CompletionError::Api(format!("HTTP {}: {}", status, text));
                }
                Err(e) => last_error = CompletionError::Network(e.to_string()),
            }
        }

        warn!("streamed completion failed after {} attempts", attempts);
        Err(last_error)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let body = self.request_body(messages, false);
        let attempts = self.config.max_retries.max(1);
        let mut last_error = CompletionError::Network("request not attempted".to_string());

        for attempt in 0..attempts {
            if attempt > 0 {
                debug!(attempt, "retrying completion");
                tokio::time::sleep(Duration::from_millis(100 * (1 << attempt))).await;
            }

            let response = match self
                .post(&body)
                .timeout(Duration::from_secs(self.config.timeout_secs))
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = CompletionError::Network(e.to_string());
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                last_error = CompletionError::Api(format!("HTTP {}: {}", status, text));
                continue;
            }

            match response.json::<ChatCompletionResponse>().await {
                Ok(resp) => match resp.choices.into_iter().next() {
                    Some(choice) => {
                        debug!("completion succeeded");
                        return Ok(choice.message.content);
                    }
                    None => {
                        last_error = CompletionError::Api("no choices in response".to_string());
                    }
                },
                Err(e) => {
                    last_error =
                        CompletionError::Api(format!("failed to parse response: {}", e));
                }
            }
        }

        warn!("completion failed after {} attempts", attempts);
        Err(last_error)
    }
}

// OpenAI-compatible wire types. `Message` serializes to the {role, content}
// objects the API expects, so the window goes on the wire untransformed.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new(CompletionConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_request_serializes_window_untransformed() {
        let client = OpenAiClient::new(CompletionConfig::default()).unwrap();
        let window = vec![Message::system("S"), Message::user("hi")];
        let body = client.request_body(&window, false);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4.1-nano");
        assert_eq!(json["stream"], false);
        assert_eq!(
            json["messages"][0],
            serde_json::json!({"role": "system", "content": "S"})
        );
        assert!(json.get("max_tokens").is_none());
    }
}
