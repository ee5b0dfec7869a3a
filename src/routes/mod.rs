// ABOUTME: Route module organization for the persona chat server HTTP endpoints
// ABOUTME: Merges webhook, admin and health routes under shared tracing and body limit layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route module for the persona chat server
//!
//! Each domain module holds route definitions and thin handlers that
//! delegate to the service layer.

/// Operator endpoints
pub mod admin;
/// Health check and readiness routes
pub mod health;
/// Inbound webhook intake
pub mod webhook;

pub use admin::AdminRoutes;
pub use health::HealthRoutes;
pub use webhook::WebhookRoutes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::constants::limits::{MAX_REQUEST_BODY_BYTES, REQUEST_TIMEOUT_SECS};
use crate::resources::ServerResources;

/// Full application router
///
/// The webhook sits outside the request timeout: a turn is bounded by the
/// per-attempt generation timeouts, and events of one user run in sequence.
pub fn router(resources: Arc<ServerResources>) -> Router {
    let bounded = Router::new()
        .merge(AdminRoutes::routes(Arc::clone(&resources)))
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)));

    Router::new()
        .merge(WebhookRoutes::routes(resources))
        .merge(bounded)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
