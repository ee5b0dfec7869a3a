// ABOUTME: Webhook intake route accepting pre-parsed inbound message events
// ABOUTME: Runs each event as its own task and reports a per-event delivery status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::services::dispatch::InboundEvent;

/// Webhook body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Events in delivery order
    pub events: Vec<InboundEvent>,
}

/// Outcome of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// A reply was delivered
    Replied,
    /// Handled without a reply
    NoReply,
    /// Reply could not be delivered
    Failed,
}

/// Per-event entry of the webhook response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResult {
    /// Sender of the event
    pub user_id: String,
    /// What happened
    pub status: EventStatus,
}

/// Webhook response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    /// One entry per event, in request order
    pub results: Vec<EventResult>,
}

/// Webhook routes implementation
pub struct WebhookRoutes;

impl WebhookRoutes {
    /// Create the webhook route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/webhook", post(Self::handle_webhook))
            .with_state(resources)
    }

    async fn handle_webhook(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> AppResult<Json<WebhookResponse>> {
        let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "Malformed webhook payload");
            AppError::invalid_input("Malformed webhook payload")
        })?;
        info!(events = payload.events.len(), "Webhook received");

        // Spawned so a dropped request cannot cancel a turn halfway through
        let handles = payload.events.iter().cloned().map(|event| {
            let resources = Arc::clone(&resources);
            tokio::spawn(async move { resources.chatbot.handle_event(&event).await })
        });
        let outcomes = join_all(handles).await;

        let results = payload
            .events
            .iter()
            .zip(outcomes)
            .map(|(event, outcome)| EventResult {
                user_id: event.user_id.clone(),
                status: match outcome {
                    Ok(Ok(Some(_))) => EventStatus::Replied,
                    Ok(Ok(None)) => EventStatus::NoReply,
                    Ok(Err(_)) => EventStatus::Failed,
                    Err(e) => {
                        error!(user_id = %event.user_id, error = %e, "Event task aborted");
                        EventStatus::Failed
                    }
                },
            })
            .collect();
        Ok(Json(WebhookResponse { results }))
    }
}
