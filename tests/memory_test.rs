// ABOUTME: Integration tests for per-user, per-persona conversation memory
// ABOUTME: Interaction counting, relationship levels, template gating, history window and reset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use anyhow::Result;
use persona_chat_server::memory::{ConversationMemory, PreferencesPatch};
use persona_chat_server::models::{
    ConversationLength, ConversationState, Emotion, Language, MessageContext, RelationshipLevel,
    Sender, TimeOfDay, Topic,
};
use persona_chat_server::test_utils::{FixedRandom, SequenceRandom};

async fn add_turns(memory: &ConversationMemory, user: &str, persona: &str, count: usize) -> Result<()> {
    for i in 0..count {
        let sender = if i % 2 == 0 { Sender::User } else { Sender::Persona };
        memory
            .add_message(user, persona, sender, &format!("message {i}"), None, None)
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_interaction_count_is_monotonic() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    for n in 1..=55_u64 {
        let state = memory
            .add_message("U1", "velorien", Sender::User, "hi", None, None)
            .await?;
        assert_eq!(state.interaction_count, n);
        let expected = if n < 20 {
            RelationshipLevel::New
        } else if n < 50 {
            RelationshipLevel::Familiar
        } else {
            RelationshipLevel::Close
        };
        assert_eq!(state.relationship_level, expected, "after {n} messages");
    }
    Ok(())
}

#[tokio::test]
async fn test_message_window_is_bounded() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    add_turns(&memory, "U1", "velorien", 30).await?;

    let state = memory.get_state("U1", "velorien").await?;
    assert_eq!(state.messages.len(), 20);
    assert_eq!(state.interaction_count, 30);
    assert_eq!(state.messages[0].text, "message 10");
    assert_eq!(state.messages[19].text, "message 29");
    Ok(())
}

#[tokio::test]
async fn test_template_gate_follows_relationship_level() -> Result<()> {
    // New users always pass regardless of the draw
    let memory = common::memory(Arc::new(FixedRandom(0.1)));
    assert!(
        memory
            .should_use_template("U1", "velorien", Emotion::Lonely, MessageContext::UserExpressesLoneliness)
            .await?
    );

    // Familiar users pass only when the draw exceeds 0.3
    add_turns(&memory, "U1", "velorien", 20).await?;
    assert_eq!(
        memory.get_state("U1", "velorien").await?.relationship_level,
        RelationshipLevel::Familiar
    );
    assert!(
        !memory
            .should_use_template("U1", "velorien", Emotion::Lonely, MessageContext::UserExpressesLoneliness)
            .await?
    );

    let memory = common::memory(Arc::new(SequenceRandom::new(vec![0.5])));
    add_turns(&memory, "U2", "velorien", 20).await?;
    assert!(
        memory
            .should_use_template("U2", "velorien", Emotion::Neutral, MessageContext::UserGreets)
            .await?
    );

    // Close users need a draw above 0.7
    add_turns(&memory, "U2", "velorien", 30).await?;
    assert_eq!(
        memory.get_state("U2", "velorien").await?.relationship_level,
        RelationshipLevel::Close
    );
    assert!(
        !memory
            .should_use_template("U2", "velorien", Emotion::Neutral, MessageContext::UserGreets)
            .await?
    );
    Ok(())
}

#[tokio::test]
async fn test_clear_restores_fresh_state() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    let first = memory.get_state("U1", "sherlock").await?;
    assert_eq!(first, ConversationState::new("U1", "sherlock"));

    add_turns(&memory, "U1", "sherlock", 6).await?;
    memory.clear("U1", "sherlock").await?;

    assert_eq!(memory.get_state("U1", "sherlock").await?, first);
    Ok(())
}

#[tokio::test]
async fn test_pairs_are_isolated() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    add_turns(&memory, "U1", "velorien", 4).await?;
    add_turns(&memory, "U1", "sherlock", 2).await?;

    memory.clear("U1", "velorien").await?;
    assert_eq!(memory.get_state("U1", "velorien").await?.interaction_count, 0);
    assert_eq!(memory.get_state("U1", "sherlock").await?.interaction_count, 2);
    assert_eq!(memory.get_state("U2", "sherlock").await?.interaction_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_separator_in_user_id_does_not_merge_pairs() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    add_turns(&memory, "a:b", "c", 3).await?;
    add_turns(&memory, "a", "b:c", 1).await?;

    assert_eq!(memory.get_state("a:b", "c").await?.interaction_count, 3);
    assert_eq!(memory.get_state("a", "b:c").await?.interaction_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_contextual_conditions() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    add_turns(&memory, "U1", "velorien", 6).await?;

    let conditions = memory
        .contextual_conditions_at("U1", "velorien", "วันนี้เศร้ามาก", 8)
        .await?;
    assert_eq!(conditions.time_of_day, TimeOfDay::Morning);
    assert_eq!(conditions.user_mood, vec![Emotion::Sad]);
    assert_eq!(conditions.conversation_length, ConversationLength::Medium);
    assert_eq!(conditions.relationship_level, RelationshipLevel::New);

    let night = memory
        .contextual_conditions_at("U1", "velorien", "hello", 23)
        .await?;
    assert_eq!(night.time_of_day, TimeOfDay::Night);
    Ok(())
}

#[tokio::test]
async fn test_summary_counts_recent_messages() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    add_turns(&memory, "U1", "velorien", 12).await?;

    let summary = memory.summary("U1", "velorien").await?;
    assert_eq!(summary.total_messages, 12);
    assert_eq!(summary.recent_user_messages, 5);
    assert_eq!(summary.recent_persona_messages, 5);
    assert_eq!(summary.relationship_level, RelationshipLevel::New);
    Ok(())
}

#[tokio::test]
async fn test_preferences_inferred_then_patched() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    for text in [
        "I have an exam tomorrow and I am worried",
        "My school homework is too much",
        "Can you help me study for the test",
    ] {
        memory
            .add_message("U1", "hermione", Sender::User, text, None, None)
            .await?;
    }

    let state = memory.get_state("U1", "hermione").await?;
    assert_eq!(state.user_preferences.language, Language::English);

    let preferences = memory
        .update_preferences(
            "U1",
            "hermione",
            PreferencesPatch {
                avoid_topics: Some(vec![Topic::Family]),
                ..PreferencesPatch::default()
            },
        )
        .await?;
    assert_eq!(preferences.avoid_topics, vec![Topic::Family]);
    assert_eq!(preferences.language, Language::English);

    // Inference on the next message keeps the explicit avoid list
    let state = memory
        .add_message("U1", "hermione", Sender::User, "Thanks for the help", None, None)
        .await?;
    assert_eq!(state.user_preferences.avoid_topics, vec![Topic::Family]);
    Ok(())
}

#[tokio::test]
async fn test_relevant_history_keeps_persona_and_similar_user_turns() -> Result<()> {
    let memory = common::memory(Arc::new(FixedRandom(0.5)));
    memory
        .add_message("U1", "sherlock", Sender::User, "the missing red ledger", None, None)
        .await?;
    memory
        .add_message("U1", "sherlock", Sender::Persona, "Elementary.", None, None)
        .await?;
    memory
        .add_message("U1", "sherlock", Sender::User, "what about lunch", None, None)
        .await?;

    let relevant = memory
        .relevant_history("U1", "sherlock", "where is the red ledger", 5)
        .await?;
    let texts: Vec<&str> = relevant.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["the missing red ledger", "Elementary."]);
    Ok(())
}
