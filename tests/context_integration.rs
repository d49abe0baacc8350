//! Integration tests for the context core
//!
//! Drives the buffering policies and session object through the public API,
//! covering the documented windowing behavior end to end.

use chat_context::{
    build_buffered_messages, build_last_two_user_turns, count_message_tokens, estimate_tokens,
    BufferPolicy, ChatSession, ContextConfig, Message, RecentTurnsStrategy, Role,
    TokenBudgetStrategy, DEFAULT_SYSTEM_PROMPT,
};
use chat_context::ContextStrategy;
use std::sync::Arc;

#[test]
fn test_estimator_laws() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("a"), 1);
    assert_eq!(estimate_tokens(&"x".repeat(40)), 10);

    assert_eq!(count_message_tokens(&[]), 0);
    let messages = vec![Message::user("12345678"), Message::assistant("")];
    assert_eq!(
        count_message_tokens(&messages),
        (4 + estimate_tokens("12345678")) + (4 + 0)
    );
}

#[test]
fn test_generous_budget_keeps_full_history() {
    let history = vec![
        Message::system("S"),
        Message::user("hi"),
        Message::assistant("hello"),
        Message::user("bye"),
    ];
    assert_eq!(build_buffered_messages(&history, 1000), history);
}

#[test]
fn test_minimal_budget_degrades_to_system_only() {
    // Each candidate costs at least 5 tokens (overhead 4 + minimum 1), so a
    // budget of 4 can never accept anything beyond the system message.
    let history = vec![
        Message::system("S"),
        Message::user("hi"),
        Message::assistant("hello"),
        Message::user("bye"),
    ];
    assert_eq!(
        build_buffered_messages(&history, 4),
        vec![Message::system("S")]
    );
}

#[test]
fn test_last_two_turns_with_trailing_partial_exchange() {
    let history = vec![
        Message::system("S"),
        Message::user("one"),
        Message::assistant("reply one"),
        Message::user("two"),
        Message::assistant("reply two"),
        Message::user("three"),
    ];
    assert_eq!(
        build_last_two_user_turns(&history),
        vec![
            Message::system("S"),
            Message::user("two"),
            Message::assistant("reply two"),
            Message::user("three"),
        ]
    );
}

#[test]
fn test_window_is_wire_ready() {
    // The reduced window serializes directly to the completions `messages`
    // payload without any transformation.
    let window = build_buffered_messages(&[Message::user("hi")], 1000);
    let json = serde_json::to_value(&window).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"role": "system", "content": DEFAULT_SYSTEM_PROMPT},
            {"role": "user", "content": "hi"},
        ])
    );
}

#[test]
fn test_session_turn_flow_under_budget() {
    // A full multi-turn session: history grows without bound while the
    // derived window stays within budget every turn.
    let strategy = Arc::new(TokenBudgetStrategy::new(60));
    let mut session = ChatSession::with_system(strategy, "Keep answers short.");

    for turn in 0..10 {
        session.push_user(format!("question number {} with some padding text", turn));
        let window = session.context();

        assert_eq!(window[0].role, Role::System);
        assert!(count_message_tokens(&window) <= 60);

        session.push_assistant(format!("answer number {}", turn));
    }

    // 1 system + 10 user + 10 assistant
    assert_eq!(session.len(), 21);
    // The window kept the most recent messages, not the oldest.
    let window = session.context();
    let last = &window[window.len() - 1];
    assert_eq!(last.content, "answer number 9");
}

#[test]
fn test_policies_are_interchangeable() {
    let history = vec![
        Message::user("one"),
        Message::assistant("r1"),
        Message::user("two"),
        Message::assistant("r2"),
        Message::user("three"),
    ];

    let strategies: Vec<Arc<dyn ContextStrategy>> = vec![
        Arc::new(TokenBudgetStrategy::new(1000)),
        Arc::new(RecentTurnsStrategy::new(2)),
    ];
    for strategy in strategies {
        let window = strategy.reduce(&history);
        assert_eq!(window[0].role, Role::System);
        // Relative order of the kept history is preserved.
        let contents: Vec<&str> = window[1..].iter().map(|m| m.content.as_str()).collect();
        let mut expected: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        expected.retain(|c| contents.contains(c));
        assert_eq!(contents, expected);
    }
}

#[test]
fn test_configured_policy_selection() {
    let history = vec![
        Message::user("one"),
        Message::assistant("r1"),
        Message::user("two"),
        Message::assistant("r2"),
        Message::user("three"),
    ];

    let mut config = ContextConfig::default();
    config.policy = BufferPolicy::RecentTurns;
    config.recent_user_turns = 1;

    let window = config.strategy().reduce(&history);
    assert_eq!(window.len(), 2);
    assert_eq!(window[1], Message::user("three"));
}
