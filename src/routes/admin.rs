// ABOUTME: Operator endpoints over the escalation coordinator
// ABOUTME: Pending requests, operator replies, session end, session info and operator assignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Admin routes
//!
//! Failures answer with a fixed operator-facing message; the underlying error
//! is only logged.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::constants::messages::{
    ADMIN_ASSIGNED, ADMIN_ASSIGN_FAILED, ADMIN_RESPONSE_FAILED, ADMIN_RESPONSE_SENT,
    ESCALATION_ENDED, ESCALATION_END_FAILED, SESSION_LOOKUP_FAILED, SESSION_NOT_FOUND,
};
use crate::errors::AppError;
use crate::models::AdminNotification;
use crate::resources::ServerResources;

/// Body of `POST /admin/respond`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRespondRequest {
    /// Recipient
    pub user_id: String,
    /// Responding operator
    pub admin_id: String,
    /// Reply text
    pub message: String,
}

/// Body of `POST /admin/end-session`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndSessionRequest {
    /// User returning to persona chat
    pub user_id: String,
    /// Persona to switch to
    #[serde(default)]
    pub character_id: Option<String>,
}

/// Body of `POST /admin/assign`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignAdminRequest {
    /// User to assign
    pub user_id: String,
    /// Operator taking the session
    pub admin_id: String,
}

/// Body of `GET /admin/requests`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequestsResponse {
    /// Waiting users, oldest first
    pub requests: Vec<AdminNotification>,
    /// Number of entries in `requests`
    pub count: usize,
}

/// Body of mutating admin endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminActionResponse {
    /// Whether the action was applied
    pub success: bool,
    /// Operator-facing text
    pub message: String,
}

impl AdminActionResponse {
    fn ok(message: &str) -> Response {
        Json(Self {
            success: true,
            message: message.to_owned(),
        })
        .into_response()
    }

    fn failed(error: &AppError, message: &str) -> Response {
        let status = StatusCode::from_u16(error.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(Self {
                success: false,
                message: message.to_owned(),
            }),
        )
            .into_response()
    }
}

/// Admin routes implementation
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/admin/requests", get(Self::list_requests))
            .route("/admin/respond", post(Self::respond))
            .route("/admin/end-session", post(Self::end_session))
            .route("/admin/sessions/:user_id", get(Self::session_info))
            .route("/admin/assign", post(Self::assign))
            .with_state(resources)
    }

    async fn list_requests(State(resources): State<Arc<ServerResources>>) -> Response {
        match resources.escalation().list_pending().await {
            Ok(requests) => Json(PendingRequestsResponse {
                count: requests.len(),
                requests,
            })
            .into_response(),
            Err(e) => {
                error!(error = %e, "Failed to list pending requests");
                AdminActionResponse::failed(&e, SESSION_LOOKUP_FAILED)
            }
        }
    }

    async fn respond(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AdminRespondRequest>,
    ) -> Response {
        match resources
            .chatbot
            .deliver_admin_reply(&request.user_id, &request.admin_id, &request.message)
            .await
        {
            Ok(()) => AdminActionResponse::ok(ADMIN_RESPONSE_SENT),
            Err(e) => {
                error!(user_id = %request.user_id, error = %e, "Failed to send admin response");
                AdminActionResponse::failed(&e, ADMIN_RESPONSE_FAILED)
            }
        }
    }

    async fn end_session(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<EndSessionRequest>,
    ) -> Response {
        match resources
            .escalation()
            .end_escalation(&request.user_id, request.character_id.as_deref())
            .await
        {
            Ok(_) => AdminActionResponse::ok(ESCALATION_ENDED),
            Err(e) => {
                error!(user_id = %request.user_id, error = %e, "Failed to end admin session");
                AdminActionResponse::failed(&e, ESCALATION_END_FAILED)
            }
        }
    }

    async fn session_info(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Response {
        match resources.escalation().session_info(&user_id).await {
            Ok(Some(info)) => Json(info).into_response(),
            Ok(None) => (
                StatusCode::NOT_FOUND,
                Json(AdminActionResponse {
                    success: false,
                    message: SESSION_NOT_FOUND.to_owned(),
                }),
            )
                .into_response(),
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to load session info");
                AdminActionResponse::failed(&e, SESSION_LOOKUP_FAILED)
            }
        }
    }

    async fn assign(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AssignAdminRequest>,
    ) -> Response {
        match resources
            .escalation()
            .assign_admin(&request.user_id, &request.admin_id)
            .await
        {
            Ok(_) => AdminActionResponse::ok(ADMIN_ASSIGNED),
            Err(e) => {
                error!(user_id = %request.user_id, error = %e, "Failed to assign admin");
                AdminActionResponse::failed(&e, ADMIN_ASSIGN_FAILED)
            }
        }
    }
}
