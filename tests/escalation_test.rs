// ABOUTME: Integration tests for the human escalation coordinator
// ABOUTME: Priorities, pending order, operator replies, assignment, session info and idempotent end
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use persona_chat_server::constants::messages::ESCALATION_ACK_PREFIX;
use persona_chat_server::errors::{AppError, AppResult, ErrorCode};
use persona_chat_server::models::{AdminNotification, HistorySender, Priority, SessionMode};
use persona_chat_server::notifications::{InMemoryNotificationSink, NotificationSink};
use persona_chat_server::services::escalation::EscalationCoordinator;
use persona_chat_server::session::SessionStore;
use persona_chat_server::store::MemoryStore;
use tokio::time::sleep;

/// Sink whose queue is unreachable
struct UnreachableSink;

#[async_trait]
impl NotificationSink for UnreachableSink {
    async fn enqueue(&self, _notification: AdminNotification) -> AppResult<()> {
        Err(AppError::new(ErrorCode::ExternalServiceError, "queue unreachable"))
    }

    async fn list_pending(&self) -> AppResult<Vec<AdminNotification>> {
        Ok(Vec::new())
    }

    async fn resolve(&self, _user_id: &str) -> AppResult<()> {
        Ok(())
    }
}

fn coordinator() -> (EscalationCoordinator, SessionStore, Arc<InMemoryNotificationSink>) {
    let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
    let sink = Arc::new(InMemoryNotificationSink::new());
    let coordinator = EscalationCoordinator::new(sessions.clone(), sink.clone());
    (coordinator, sessions, sink)
}

#[tokio::test]
async fn test_request_sets_waiting_mode_and_notifies() -> Result<()> {
    common::init_test_logging();
    let (coordinator, sessions, sink) = coordinator();

    let ack = coordinator.request_escalation("U1", "ฉุกเฉิน เพื่อนหมดสติ").await?;
    assert!(ack.starts_with(ESCALATION_ACK_PREFIX));
    assert!(ack.ends_with("ฉุกเฉิน เพื่อนหมดสติ"));

    let session = sessions.get("U1").await?.unwrap();
    assert_eq!(session.mode, SessionMode::HumanAdmin);
    assert!(session.is_waiting_for_human);
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.history[0].sender, HistorySender::User);

    let notifications = sink.list_pending().await?;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].priority, Priority::High);
    Ok(())
}

#[tokio::test]
async fn test_pending_ordered_by_last_activity_not_priority() -> Result<()> {
    let (coordinator, _, _) = coordinator();

    coordinator.request_escalation("U-low", "สวัสดีครับ").await?;
    sleep(Duration::from_millis(5)).await;
    coordinator.request_escalation("U-high", "ฉุกเฉิน!").await?;

    let pending = coordinator.list_pending().await?;
    let order: Vec<(&str, Priority)> = pending
        .iter()
        .map(|n| (n.user_id.as_str(), n.priority))
        .collect();
    assert_eq!(
        order,
        vec![("U-low", Priority::Low), ("U-high", Priority::High)]
    );
    Ok(())
}

#[tokio::test]
async fn test_follow_up_messages_keep_queue_position() -> Result<()> {
    let (coordinator, _, _) = coordinator();

    coordinator.request_escalation("U1", "first").await?;
    sleep(Duration::from_millis(5)).await;
    coordinator.request_escalation("U2", "second").await?;
    coordinator.record_user_message("U1", "still there?").await?;

    let pending = coordinator.list_pending().await?;
    assert_eq!(pending[0].user_id, "U1");
    assert_eq!(pending[0].user_message, "still there?");
    Ok(())
}

#[tokio::test]
async fn test_admin_reply_keeps_operator_mode() -> Result<()> {
    let (coordinator, _, sink) = coordinator();
    coordinator.request_escalation("U1", "need help").await?;

    let session = coordinator.admin_respond("U1", "admin-7", "สวัสดีครับ ผู้ดูแลเองครับ").await?;
    assert_eq!(session.mode, SessionMode::HumanAdmin);
    assert!(!session.is_waiting_for_human);
    assert_eq!(session.assigned_admin_id.as_deref(), Some("admin-7"));
    assert_eq!(session.history.last().unwrap().sender, HistorySender::HumanAdmin);

    assert!(coordinator.list_pending().await?.is_empty());
    assert!(sink.list_pending().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_admin_reply_to_unknown_user_is_not_found() {
    let (coordinator, _, _) = coordinator();
    let error = coordinator
        .admin_respond("ghost", "admin-1", "hello")
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);

    let error = coordinator.assign_admin("ghost", "admin-1").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_end_escalation_is_idempotent() -> Result<()> {
    let (coordinator, _, _) = coordinator();
    coordinator.request_escalation("U1", "help").await?;
    coordinator.assign_admin("U1", "admin-2").await?;

    let ended = coordinator.end_escalation("U1", Some("sherlock")).await?;
    assert_eq!(ended.mode, SessionMode::Character);
    assert!(!ended.is_waiting_for_human);
    assert_eq!(ended.assigned_admin_id, None);
    assert_eq!(ended.current_persona_id.as_deref(), Some("sherlock"));

    let again = coordinator.end_escalation("U1", Some("sherlock")).await?;
    assert_eq!(again, ended);

    let without_persona = coordinator.end_escalation("U1", None).await?;
    assert_eq!(without_persona, ended);
    Ok(())
}

#[tokio::test]
async fn test_session_info_returns_last_ten_entries() -> Result<()> {
    let (coordinator, _, _) = coordinator();
    assert!(coordinator.session_info("U1").await?.is_none());

    coordinator.request_escalation("U1", "message 0").await?;
    for i in 1..15 {
        coordinator
            .record_user_message("U1", &format!("message {i}"))
            .await?;
    }

    let info = coordinator.session_info("U1").await?.unwrap();
    assert_eq!(info.recent_messages.len(), 10);
    assert_eq!(info.recent_messages[0].message, "message 5");
    assert_eq!(info.recent_messages[9].message, "message 14");
    assert!(info.is_waiting_for_human);
    Ok(())
}

#[tokio::test]
async fn test_failed_notification_keeps_user_with_persona() -> Result<()> {
    common::init_test_logging();
    let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
    let coordinator = EscalationCoordinator::new(sessions.clone(), Arc::new(UnreachableSink));
    sessions.set_persona("U1", "luna").await?;

    let error = coordinator
        .request_escalation("U1", "ช่วยด้วย")
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ExternalServiceError);

    let session = sessions.get("U1").await?.unwrap();
    assert_eq!(session.mode, SessionMode::Character);
    assert!(!session.is_waiting_for_human);
    assert!(session.history.is_empty());
    assert!(coordinator.list_pending().await?.is_empty());
    Ok(())
}
