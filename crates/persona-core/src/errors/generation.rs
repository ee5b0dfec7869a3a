// ABOUTME: Error taxonomy for generative text backends
// ABOUTME: Maps each failure kind to retry policy and a fixed user-facing fallback message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Generation Error Types
//!
//! - `GenerationErrorKind` - the five failure classes a backend can report
//! - `GenerationError` - kind plus diagnostic message
//! - Conversion to `AppError` for the HTTP boundary

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AppError, ErrorCode};

/// Classes of generative backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// Backend quota or rate limit exceeded
    RateLimited,
    /// Prompt or candidate blocked by content-safety filters
    SafetyBlocked,
    /// Transport failure or per-attempt timeout
    Network,
    /// API key missing, invalid or revoked
    Auth,
    /// Anything else, including rejected or empty output
    Unknown,
}

impl GenerationErrorKind {
    /// Whether another attempt may succeed.
    ///
    /// Auth failures and safety blocks are deterministic for a given prompt.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Network | Self::Unknown)
    }

    /// Fixed text shown to the user when generation gives up with this kind
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::RateLimited => "I'm a bit busy right now! Please try again in a moment.",
            Self::SafetyBlocked => {
                "I'd prefer not to discuss that topic. Let's talk about something else!"
            }
            Self::Network => "Sorry, I'm having trouble connecting right now. Please try again!",
            Self::Auth => "I'm having technical difficulties. Please contact support.",
            Self::Unknown => "Oops! Something went wrong. Let me try to respond differently.",
        }
    }

    /// Stable identifier used in structured logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::SafetyBlocked => "safety_blocked",
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a generative backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    /// Failure class
    pub kind: GenerationErrorKind,
    /// Diagnostic detail, never shown to end users
    pub message: String,
}

impl GenerationError {
    /// Create an error of the given kind
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Rate limit or quota error
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::RateLimited, message)
    }

    /// Content-safety block
    pub fn safety_blocked(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::SafetyBlocked, message)
    }

    /// Transport failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Network, message)
    }

    /// Credential failure
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Auth, message)
    }

    /// Unclassified failure
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Unknown, message)
    }

    /// See [`GenerationErrorKind::is_retryable`]
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// See [`GenerationErrorKind::fallback_message`]
    #[must_use]
    pub const fn fallback_message(&self) -> &'static str {
        self.kind.fallback_message()
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation failed ({}): {}", self.kind, self.message)
    }
}

impl Error for GenerationError {}

impl From<GenerationError> for AppError {
    fn from(error: GenerationError) -> Self {
        let code = match error.kind {
            GenerationErrorKind::RateLimited => ErrorCode::ExternalRateLimited,
            GenerationErrorKind::Auth => ErrorCode::ExternalAuthFailed,
            GenerationErrorKind::Network => ErrorCode::ExternalServiceUnavailable,
            GenerationErrorKind::SafetyBlocked | GenerationErrorKind::Unknown => {
                ErrorCode::ExternalServiceError
            }
        };
        Self::new(code, error.to_string())
    }
}
