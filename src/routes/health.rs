// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness on /health, readiness with a generative backend check on /ready
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Health check routes
//!
//! `/health` answers as long as the process serves requests. `/ready` also
//! asks the generative backend for a cheap round trip.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health))
            .route("/ready", get(Self::ready))
            .with_state(resources)
    }

    async fn health(State(resources): State<Arc<ServerResources>>) -> Json<serde_json::Value> {
        let uptime = Utc::now() - resources.started_at;
        Json(json!({
            "status": "healthy",
            "uptime_seconds": uptime.num_seconds(),
            "timestamp": Utc::now().to_rfc3339()
        }))
    }

    async fn ready(State(resources): State<Arc<ServerResources>>) -> Response {
        let backend = resources.backend.name();
        match resources.backend.health_check().await {
            Ok(()) => Json(json!({
                "status": "ready",
                "backend": backend,
                "timestamp": Utc::now().to_rfc3339()
            }))
            .into_response(),
            Err(e) => {
                warn!(backend = %backend, error = %e, "Backend health check failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "status": "unavailable",
                        "backend": backend,
                        "reason": e.kind.as_str(),
                        "timestamp": Utc::now().to_rfc3339()
                    })),
                )
                    .into_response()
            }
        }
    }
}
