// ABOUTME: Integration tests for inbound event dispatch through the chatbot service
// ABOUTME: Commands, persona switching, operator hand-off, info mode and transport failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use anyhow::Result;
use futures_util::future::join_all;
use persona_chat_server::constants::messages::{
    persona_switched, ESCALATION_ACK_PREFIX, ESCALATION_ENDED, HELP, INFO_MODE_ENTERED,
    MEMORY_RESET, PERSONA_NOT_FOUND, SWITCH_USAGE, UNKNOWN_COMMAND, WAITING_FOR_ADMIN,
};
use persona_chat_server::errors::ErrorCode;
use persona_chat_server::models::SessionMode;
use persona_chat_server::resources::ServerResources;
use persona_chat_server::services::dispatch::InboundEvent;
use persona_chat_server::test_utils::{test_resources, FixedRandom, RecordingTransport, ScriptedBackend};

const REPLY: &str = "ผมอยู่ตรงนี้นะครับ เล่าให้ผมฟังได้เสมอ 💙";

struct Harness {
    resources: ServerResources,
    backend: Arc<ScriptedBackend>,
    transport: Arc<RecordingTransport>,
}

fn harness() -> Result<Harness> {
    common::init_test_logging();
    let backend = Arc::new(ScriptedBackend::new(REPLY));
    let transport = Arc::new(RecordingTransport::new());
    let resources = test_resources(
        backend.clone(),
        Arc::new(FixedRandom(0.99)),
        transport.clone(),
    )?;
    Ok(Harness {
        resources,
        backend,
        transport,
    })
}

fn event(user_id: &str, text: &str) -> InboundEvent {
    InboundEvent {
        user_id: user_id.to_owned(),
        text: text.to_owned(),
        reply_token: format!("token-{user_id}"),
    }
}

async fn send(harness: &Harness, user_id: &str, text: &str) -> Result<Option<String>> {
    let reply = harness
        .resources
        .chatbot
        .handle_event(&event(user_id, text))
        .await?;
    Ok(reply.map(|message| message.text))
}

async fn interactions(harness: &Harness, user_id: &str, persona_id: &str) -> Result<u64> {
    Ok(harness
        .resources
        .chatbot
        .orchestrator()
        .memory()
        .get_state(user_id, persona_id)
        .await?
        .interaction_count)
}

#[tokio::test]
async fn test_plain_message_goes_to_default_persona() -> Result<()> {
    let harness = harness()?;

    let reply = send(&harness, "U1", "สวัสดีครับ").await?;
    assert_eq!(reply.as_deref(), Some(REPLY));
    assert!(harness.backend.calls() >= 1);
    assert_eq!(interactions(&harness, "U1", "velorien").await?, 2);

    let replies = harness.transport.replies().await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, "token-U1");
    assert!(replies[0].1.quick_replies.contains(&"/characters".to_owned()));
    Ok(())
}

#[tokio::test]
async fn test_characters_lists_every_active_persona() -> Result<()> {
    let harness = harness()?;
    let message = harness
        .resources
        .chatbot
        .handle_event(&event("U1", "/characters"))
        .await?
        .unwrap();

    for name in ["Hermione", "Luna", "Sherlock", "Velorien", "Yoda"] {
        assert!(message.text.contains(name), "missing {name}");
        assert!(message.quick_replies.contains(&format!("/switch {name}")));
    }
    assert_eq!(harness.backend.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_switch_clears_previous_persona_memory() -> Result<()> {
    let harness = harness()?;
    send(&harness, "U1", "สวัสดีครับ").await?;
    assert_eq!(interactions(&harness, "U1", "velorien").await?, 2);

    let reply = send(&harness, "U1", "/switch holmes").await?;
    assert_eq!(reply, Some(persona_switched("Sherlock")));
    assert_eq!(interactions(&harness, "U1", "velorien").await?, 0);

    send(&harness, "U1", "I lost my notebook").await?;
    assert_eq!(interactions(&harness, "U1", "sherlock").await?, 2);
    assert_eq!(interactions(&harness, "U1", "velorien").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_switch_without_match_or_name() -> Result<()> {
    let harness = harness()?;
    assert_eq!(
        send(&harness, "U1", "/switch Gandalf").await?.as_deref(),
        Some(PERSONA_NOT_FOUND)
    );
    assert_eq!(send(&harness, "U1", "/switch").await?.as_deref(), Some(SWITCH_USAGE));
    assert_eq!(send(&harness, "U1", "/dance").await?.as_deref(), Some(UNKNOWN_COMMAND));
    assert_eq!(send(&harness, "U1", "/help").await?.as_deref(), Some(HELP));
    Ok(())
}

#[tokio::test]
async fn test_operator_hand_off_round_trip() -> Result<()> {
    let harness = harness()?;

    let ack = send(&harness, "U1", "I want to talk to a human").await?.unwrap();
    assert!(ack.starts_with(ESCALATION_ACK_PREFIX));

    let waiting = send(&harness, "U1", "are you there?").await?;
    assert_eq!(waiting.as_deref(), Some(WAITING_FOR_ADMIN));

    harness
        .resources
        .chatbot
        .deliver_admin_reply("U1", "admin-1", "Hi, I'm here to help")
        .await?;
    let pushes = harness.transport.pushes().await;
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, "U1");
    assert_eq!(pushes[0].1.text, "Hi, I'm here to help");

    // Once an operator answered, user messages go to the operator silently
    let replies_before = harness.transport.replies().await.len();
    assert_eq!(send(&harness, "U1", "thank you").await?, None);
    assert_eq!(harness.transport.replies().await.len(), replies_before);

    assert_eq!(send(&harness, "U1", "/back").await?.as_deref(), Some(ESCALATION_ENDED));
    assert_eq!(send(&harness, "U1", "สวัสดีครับ").await?.as_deref(), Some(REPLY));
    assert!(harness.resources.escalation().list_pending().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_admin_command_without_message_uses_default_text() -> Result<()> {
    let harness = harness()?;
    let ack = send(&harness, "U1", "/admin").await?.unwrap();
    assert!(ack.starts_with(ESCALATION_ACK_PREFIX));

    let pending = harness.resources.escalation().list_pending().await?;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, "U1");
    assert_eq!(harness.backend.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_info_mode_answers_without_backend() -> Result<()> {
    let harness = harness()?;

    assert_eq!(send(&harness, "U1", "/info").await?.as_deref(), Some(INFO_MODE_ENTERED));
    let answer = send(&harness, "U1", "How do I register?").await?.unwrap();
    assert!(answer.contains("Online Registration"));
    assert!(answer.contains("www.siriraj.hospital/medicalcamp2025"));
    assert_eq!(harness.backend.calls(), 0);

    let info = harness.resources.escalation().session_info("U1").await?.unwrap();
    assert_eq!(info.mode, SessionMode::MedicalInfo);

    send(&harness, "U1", "/switch Luna").await?;
    let info = harness.resources.escalation().session_info("U1").await?.unwrap();
    assert_eq!(info.mode, SessionMode::Character);
    assert_eq!(info.current_persona_id.as_deref(), Some("luna"));
    Ok(())
}

#[tokio::test]
async fn test_reset_clears_current_persona_memory() -> Result<()> {
    let harness = harness()?;
    send(&harness, "U1", "/switch yoda").await?;
    send(&harness, "U1", "Teach me patience").await?;
    assert_eq!(interactions(&harness, "U1", "yoda").await?, 2);

    assert_eq!(send(&harness, "U1", "/reset").await?.as_deref(), Some(MEMORY_RESET));
    assert_eq!(interactions(&harness, "U1", "yoda").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_input_after_sanitizing_gets_no_reply() -> Result<()> {
    let harness = harness()?;
    assert_eq!(send(&harness, "U1", "  <>  \n").await?, None);
    assert!(harness.transport.replies().await.is_empty());
    assert_eq!(harness.backend.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_is_reported() -> Result<()> {
    common::init_test_logging();
    let resources = test_resources(
        Arc::new(ScriptedBackend::new(REPLY)),
        Arc::new(FixedRandom(0.99)),
        Arc::new(RecordingTransport::failing()),
    )?;

    let error = resources
        .chatbot
        .handle_event(&event("U1", "/help"))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ExternalServiceError);
    Ok(())
}

#[tokio::test]
async fn test_events_of_one_user_are_serialized() -> Result<()> {
    let harness = harness()?;
    let events: Vec<InboundEvent> = (0..5)
        .map(|i| event("U1", &format!("message number {i}")))
        .collect();

    let results = join_all(
        events
            .iter()
            .map(|event| harness.resources.chatbot.handle_event(event)),
    )
    .await;
    assert!(results.iter().all(Result::is_ok));

    assert_eq!(interactions(&harness, "U1", "velorien").await?, 10);
    assert_eq!(harness.transport.replies().await.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_user_locks_are_released_after_turns() -> Result<()> {
    let harness = harness()?;
    let events: Vec<InboundEvent> = ["U1", "U2", "U1", "U3"]
        .iter()
        .map(|user_id| event(user_id, "hello there"))
        .collect();

    let results = join_all(
        events
            .iter()
            .map(|event| harness.resources.chatbot.handle_event(event)),
    )
    .await;
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(harness.resources.chatbot.busy_users(), 0);

    send(&harness, "U4", "/help").await?;
    assert_eq!(harness.resources.chatbot.busy_users(), 0);
    Ok(())
}
