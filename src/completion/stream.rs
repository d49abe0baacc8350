//! SSE frame handling for streamed completions
//!
//! Streamed chat completions arrive as server-sent events: `data: {...}`
//! frames separated by blank lines, terminated by a literal `data: [DONE]`.

use serde::Deserialize;

/// Sentinel frame ending a completion stream.
pub(crate) const DONE_FRAME: &str = "[DONE]";

/// Extract one complete SSE frame from the buffer.
///
/// Returns the frame payload (without the `data:` prefix) and the remaining
/// buffer once a blank-line separator is present, `None` until then.
pub(crate) fn extract_sse_frame(buffer: &str) -> Option<(String, String)> {
    let idx = buffer.find("\n\n")?;
    let (frame, remaining) = buffer.split_at(idx);

    let frame = frame.trim();
    let frame = frame.strip_prefix("data:").map(str::trim).unwrap_or(frame);

    Some((
        frame.to_string(),
        remaining.trim_start_matches('\n').to_string(),
    ))
}

/// One streamed chunk of a chat completion.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
}

/// Incremental message content; role-only and finish frames carry none.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}
