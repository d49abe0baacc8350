//! Heuristic token estimation
//!
//! Approximates prompt token counts without a tokenizer dependency: ~4
//! characters per token for English text, plus a small per-message overhead
//! for role and formatting. Good enough to keep a prompt under budget; not a
//! substitute for the model's real tokenizer.

use super::models::Message;

/// Characters per token assumed by the estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Fixed token overhead charged per message for role and formatting.
pub const MESSAGE_OVERHEAD_TOKENS: usize = 4;

/// Estimate the number of tokens in a text string.
///
/// Empty text is 0 tokens; anything non-empty is at least 1. Counts
/// characters, not bytes, so multi-byte input is not over-charged.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.chars().count() / CHARS_PER_TOKEN).max(1)
}

/// Approximate token count of a message list, including per-message overhead.
pub fn count_message_tokens(messages: &[Message]) -> usize {
    messages
        .iter()
        .map(|m| MESSAGE_OVERHEAD_TOKENS + estimate_tokens(&m.content))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_non_empty_text_is_at_least_one() {
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abc"), 1);
    }

    #[test]
    fn test_four_chars_per_token() {
        assert_eq!(estimate_tokens("12345678"), 2);
        assert_eq!(estimate_tokens("123456789"), 2);
        assert_eq!(estimate_tokens("123456789012"), 3);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 8 characters, 24 bytes in UTF-8
        assert_eq!(estimate_tokens("日本語日本語日本"), 2);
    }

    #[test]
    fn test_monotonic_in_length() {
        let mut prev = 0;
        for n in 0..64 {
            let tokens = estimate_tokens(&"x".repeat(n));
            assert!(tokens >= prev);
            prev = tokens;
        }
    }

    #[test]
    fn test_empty_list_is_zero() {
        assert_eq!(count_message_tokens(&[]), 0);
    }

    #[test]
    fn test_count_is_sum_of_overhead_plus_content() {
        let messages = vec![
            Message::system("S"),
            Message::user("12345678"),
            Message::assistant(""),
        ];
        // (4 + 1) + (4 + 2) + (4 + 0)
        assert_eq!(count_message_tokens(&messages), 15);
    }
}
