// ABOUTME: HTTP-level tests for webhook, admin and health routes
// ABOUTME: Drives the full router in-process with scripted backend and recording transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;
mod helpers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use helpers::axum_test::AxumTestRequest;
use persona_chat_server::constants::messages::{
    ADMIN_RESPONSE_FAILED, ADMIN_RESPONSE_SENT, ESCALATION_ENDED, SESSION_NOT_FOUND,
};
use persona_chat_server::errors::{GenerationError, GenerationErrorKind};
use persona_chat_server::models::Sender;
use persona_chat_server::routes::admin::{AdminActionResponse, PendingRequestsResponse};
use persona_chat_server::routes::webhook::{EventStatus, WebhookResponse};
use persona_chat_server::routes::router;
use persona_chat_server::test_utils::{test_resources, FixedRandom, RecordingTransport, ScriptedBackend};
use serde_json::{json, Value};

fn app_with(backend: ScriptedBackend, transport: Arc<RecordingTransport>) -> Result<Router> {
    common::init_test_logging();
    let resources = test_resources(Arc::new(backend), Arc::new(FixedRandom(0.99)), transport)?;
    Ok(router(Arc::new(resources)))
}

fn app(transport: Arc<RecordingTransport>) -> Result<Router> {
    app_with(ScriptedBackend::new("Hmm. Listening, I am."), transport)
}

fn events(items: &[(&str, &str)]) -> Value {
    let events: Vec<Value> = items
        .iter()
        .map(|(user_id, text)| {
            json!({
                "user_id": user_id,
                "text": text,
                "reply_token": format!("token-{user_id}")
            })
        })
        .collect();
    json!({ "events": events })
}

#[tokio::test]
async fn test_webhook_reports_status_per_event() -> Result<()> {
    let transport = Arc::new(RecordingTransport::new());
    let app = app(transport.clone())?;

    let response = AxumTestRequest::post("/webhook")
        .json(&events(&[("U1", "/help"), ("U2", "  <>  ")]))
        .send(app)
        .await;
    assert_eq!(response.status(), 200);

    let body: WebhookResponse = response.json();
    let statuses: Vec<(&str, EventStatus)> = body
        .results
        .iter()
        .map(|r| (r.user_id.as_str(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![("U1", EventStatus::Replied), ("U2", EventStatus::NoReply)]
    );
    assert_eq!(transport.replies().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_webhook_rejects_malformed_payload() -> Result<()> {
    let app = app(Arc::new(RecordingTransport::new()))?;

    let response = AxumTestRequest::post("/webhook")
        .raw(r#"{"events": [{"user_id": 42}"#)
        .send(app)
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    Ok(())
}

#[tokio::test]
async fn test_webhook_marks_undeliverable_replies_failed() -> Result<()> {
    let app = app(Arc::new(RecordingTransport::failing()))?;

    let response = AxumTestRequest::post("/webhook")
        .json(&events(&[("U1", "/help")]))
        .send(app)
        .await;
    assert_eq!(response.status(), 200);

    let body: WebhookResponse = response.json();
    assert_eq!(body.results[0].status, EventStatus::Failed);
    Ok(())
}

#[tokio::test]
async fn test_admin_flow_over_http() -> Result<()> {
    let transport = Arc::new(RecordingTransport::new());
    let app = app(transport.clone())?;

    AxumTestRequest::post("/webhook")
        .json(&events(&[("U1", "/admin ช่วยด้วย เจ็บหน้าอก")]))
        .send(app.clone())
        .await;

    let pending: PendingRequestsResponse =
        AxumTestRequest::get("/admin/requests").send(app.clone()).await.json();
    assert_eq!(pending.count, 1);
    assert_eq!(pending.requests[0].user_id, "U1");

    let response = AxumTestRequest::post("/admin/respond")
        .json(&json!({"user_id": "U1", "admin_id": "admin-1", "message": "กำลังดูแลให้ครับ"}))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: AdminActionResponse = response.json();
    assert!(body.success);
    assert_eq!(body.message, ADMIN_RESPONSE_SENT);
    assert_eq!(transport.pushes().await[0].1.text, "กำลังดูแลให้ครับ");

    let session: Value = AxumTestRequest::get("/admin/sessions/U1")
        .send(app.clone())
        .await
        .json();
    assert_eq!(session["mode"], "human_admin");
    assert_eq!(session["assigned_admin_id"], "admin-1");
    assert_eq!(session["is_waiting_for_human"], false);

    let response = AxumTestRequest::post("/admin/end-session")
        .json(&json!({"user_id": "U1", "character_id": "sherlock"}))
        .send(app.clone())
        .await;
    let body: AdminActionResponse = response.json();
    assert_eq!(body.message, ESCALATION_ENDED);

    let session: Value = AxumTestRequest::get("/admin/sessions/U1").send(app).await.json();
    assert_eq!(session["mode"], "character");
    assert_eq!(session["current_persona_id"], "sherlock");
    assert_eq!(session["assigned_admin_id"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn test_admin_endpoints_for_unknown_user() -> Result<()> {
    let app = app(Arc::new(RecordingTransport::new()))?;

    let response = AxumTestRequest::post("/admin/respond")
        .json(&json!({"user_id": "ghost", "admin_id": "admin-1", "message": "hello"}))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 404);
    let body: AdminActionResponse = response.json();
    assert!(!body.success);
    assert_eq!(body.message, ADMIN_RESPONSE_FAILED);

    let response = AxumTestRequest::get("/admin/sessions/ghost").send(app.clone()).await;
    assert_eq!(response.status(), 404);
    let body: AdminActionResponse = response.json();
    assert_eq!(body.message, SESSION_NOT_FOUND);

    let response = AxumTestRequest::post("/admin/assign")
        .json(&json!({"user_id": "ghost", "admin_id": "admin-1"}))
        .send(app)
        .await;
    assert_eq!(response.status(), 404);
    Ok(())
}

#[tokio::test]
async fn test_health_and_readiness() -> Result<()> {
    let app = app(Arc::new(RecordingTransport::new()))?;

    let response = AxumTestRequest::get("/health").send(app.clone()).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);

    let response = AxumTestRequest::get("/ready").send(app).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["backend"], "scripted");
    Ok(())
}

#[tokio::test]
async fn test_readiness_reports_backend_failure() -> Result<()> {
    let backend = ScriptedBackend::new("unused").unhealthy(GenerationError::auth("API key rejected"));
    let app = app_with(backend, Arc::new(RecordingTransport::new()))?;

    let response = AxumTestRequest::get("/ready").send(app).await;
    assert_eq!(response.status(), 503);
    let body: Value = response.json();
    assert_eq!(body["status"], "unavailable");
    assert_eq!(body["reason"], "auth");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_webhook_outlasts_slow_backend() -> Result<()> {
    common::init_test_logging();
    let backend = ScriptedBackend::new("unused").with_delay(Duration::from_secs(3600));
    let transport = Arc::new(RecordingTransport::new());
    let resources = Arc::new(test_resources(
        Arc::new(backend),
        Arc::new(FixedRandom(0.99)),
        transport.clone(),
    )?);
    let app = router(Arc::clone(&resources));

    let response = AxumTestRequest::post("/webhook")
        .json(&events(&[("U1", "สวัสดีครับ"), ("U1", "ยังอยู่ไหมครับ")]))
        .send(app)
        .await;
    assert_eq!(response.status(), 200);

    let body: WebhookResponse = response.json();
    assert_eq!(body.results.len(), 2);
    assert!(body.results.iter().all(|r| r.status == EventStatus::Replied));

    let replies = transport.replies().await;
    assert_eq!(replies.len(), 2);
    for (_, message) in &replies {
        assert_eq!(message.text, GenerationErrorKind::Network.fallback_message());
    }

    let state = resources
        .chatbot
        .orchestrator()
        .memory()
        .get_state("U1", "velorien")
        .await?;
    assert_eq!(state.interaction_count, 4);
    assert_eq!(state.messages.last().map(|m| m.sender), Some(Sender::Persona));
    Ok(())
}
