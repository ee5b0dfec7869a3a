// ABOUTME: Outbound messaging transport interface for replies and operator pushes
// ABOUTME: Tracing-backed transport used when no platform client is wired in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Outbound Transport
//!
//! The core produces text and optional quick-reply labels; delivery belongs to
//! a [`MessagingTransport`]. Platform clients (LINE and similar) implement it
//! outside this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppResult;

/// Message handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Text to deliver
    pub text: String,
    /// Quick-reply button labels, possibly empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<String>,
}

impl OutboundMessage {
    /// Plain text message
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    /// Attach quick-reply labels
    #[must_use]
    pub fn with_quick_replies<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quick_replies = labels.into_iter().map(Into::into).collect();
        self
    }
}

/// Delivery of outbound messages
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Answer an inbound event identified by `reply_token`
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` if the platform rejects the reply
    async fn reply(&self, reply_token: &str, message: &OutboundMessage) -> AppResult<()>;

    /// Send an unsolicited message to `user_id`
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` if the platform rejects the push
    async fn push(&self, user_id: &str, message: &OutboundMessage) -> AppResult<()>;
}

/// Transport that records outbound messages in the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTransport;

#[async_trait]
impl MessagingTransport for LoggingTransport {
    async fn reply(&self, reply_token: &str, message: &OutboundMessage) -> AppResult<()> {
        info!(
            reply_token = %reply_token,
            text_len = message.text.chars().count(),
            quick_replies = message.quick_replies.len(),
            "Outbound reply"
        );
        Ok(())
    }

    async fn push(&self, user_id: &str, message: &OutboundMessage) -> AppResult<()> {
        info!(
            user_id = %user_id,
            text_len = message.text.chars().count(),
            "Outbound push"
        );
        Ok(())
    }
}
