// ABOUTME: Application constants: limits, defaults, environment variable names and fixed user-facing text
// ABOUTME: Centralizes tunables shared across memory, generation, escalation and dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Grouped by concern so call sites read as `limits::MAX_RESPONSE_CHARS` or
//! `messages::ESCALATION_ACK_PREFIX`.

/// Fixed Thai/English reply strings
pub mod messages;

/// Service identity used in logs
pub mod service_names {
    /// Default service name
    pub const PERSONA_CHAT_SERVER: &str = "persona-chat-server";
}

/// Environment variable names read by `ServerConfig::from_env`
pub mod env_config {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Gemini API key
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    /// Gemini model name
    pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
    /// Attempts per generation
    pub const GENERATION_MAX_ATTEMPTS: &str = "GENERATION_MAX_ATTEMPTS";
    /// Linear backoff unit
    pub const GENERATION_RETRY_DELAY_MS: &str = "GENERATION_RETRY_DELAY_MS";
    /// Per-attempt timeout
    pub const GENERATION_TIMEOUT_SECS: &str = "GENERATION_TIMEOUT_SECS";
    /// Probability of considering the template path at all
    pub const TEMPLATE_GATE_PROBABILITY: &str = "TEMPLATE_GATE_PROBABILITY";
    /// Persona markdown directory
    pub const PERSONAS_DIR: &str = "PERSONAS_DIR";
    /// Info-mode content file
    pub const INFO_CONTENT_PATH: &str = "INFO_CONTENT_PATH";
    /// Response character budget
    pub const MAX_RESPONSE_CHARS: &str = "MAX_RESPONSE_CHARS";
}

/// Default configuration values
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Default Gemini model
    pub const GEMINI_MODEL: &str = "gemini-1.5-flash";
    /// Default persona when the user has not picked one
    pub const PERSONA_ID: &str = "velorien";
    /// Default persona directory
    pub const PERSONAS_DIR: &str = "personas";
    /// Default info-mode content path
    pub const INFO_CONTENT_PATH: &str = "content/info.yaml";
    /// Generation attempts
    pub const GENERATION_MAX_ATTEMPTS: u32 = 3;
    /// Backoff unit; attempt `n` waits `n * delay`
    pub const GENERATION_RETRY_DELAY_MS: u64 = 1000;
    /// Per-attempt timeout
    pub const GENERATION_TIMEOUT_SECS: u64 = 30;
    /// Template path gate
    pub const TEMPLATE_GATE_PROBABILITY: f64 = 0.05;
}

/// Sizes, windows and thresholds
pub mod limits {
    /// Messages kept per (user, persona) conversation
    pub const MAX_CONVERSATION_MESSAGES: usize = 20;
    /// Messages considered when computing conversation mood
    pub const MOOD_WINDOW: usize = 5;
    /// Messages scanned for topics
    pub const TOPIC_WINDOW: usize = 10;
    /// User messages considered when inferring preferences
    pub const PREFERENCE_WINDOW: usize = 10;
    /// Topics exposed as "recent"
    pub const RECENT_TOPICS: usize = 3;
    /// Previous turns included in the generation prompt
    pub const PROMPT_HISTORY_TURNS: usize = 6;
    /// Default size of relevance-filtered history
    pub const RELEVANT_HISTORY: usize = 5;
    /// Jaccard threshold for relevant history and repetitiveness
    pub const SIMILARITY_THRESHOLD: f64 = 0.3;
    /// Accepted responses are truncated beyond this many characters
    pub const MAX_RESPONSE_CHARS: usize = 1000;
    /// Raw generated text longer than this is rejected and retried
    pub const MAX_GENERATED_CHARS: usize = 2000;
    /// Inbound text is capped to this many characters
    pub const MAX_INPUT_CHARS: usize = 500;
    /// Session history entries kept per user
    pub const SESSION_HISTORY_CAP: usize = 100;
    /// History entries returned by session info
    pub const SESSION_INFO_HISTORY: usize = 10;
    /// Minimum validator score for a valid response
    pub const VALID_SCORE: u32 = 60;
    /// Attempts of an optimistic read-modify-write before reporting a conflict
    pub const STORE_UPDATE_ATTEMPTS: u32 = 8;
    /// Largest accepted HTTP request body
    pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
    /// Upper bound for one admin or health request
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}
