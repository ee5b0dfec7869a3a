// ABOUTME: Google Gemini generative backend over the Generative Language REST API
// ABOUTME: Sends per-call safety settings and classifies failures into generation error kinds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Gemini Backend
//!
//! Implementation of [`GenerativeBackend`] for Google's Gemini models.
//!
//! ## Configuration
//!
//! Set `GEMINI_API_KEY` (required) and optionally `GEMINI_MODEL`; see
//! [`crate::config::GeminiConfig`].
//!
//! ## Error classification
//!
//! - HTTP 429 or quota messages: `RateLimited`
//! - HTTP 401/403, or 400 mentioning the API key: `Auth`
//! - `promptFeedback.blockReason` or a `SAFETY` finish reason: `SafetyBlocked`
//! - Transport failures and 502/503/504: `Network`
//! - Everything else: `Unknown`

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::{GenerativeBackend, SafetySetting, SafetySettings};
use crate::config::GeminiConfig;
use crate::errors::GenerationError;

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reasons that mean the candidate was withheld by safety filters
const SAFETY_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "safetySettings", skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

/// Content block in Gemini format
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

/// Text part
#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

/// Generation configuration
#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "candidateCount")]
    candidate_count: u32,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// Prompt-level safety verdict
#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// API error response from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Backend Implementation
// ============================================================================

/// Google Gemini generative backend
pub struct GeminiBackend {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl Debug for GeminiBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiBackend")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiBackend {
    /// Create a backend for `model` with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE_URL.to_owned(),
            client: Client::new(),
        }
    }

    /// Create a backend from loaded configuration
    #[must_use]
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(config.api_key.clone(), config.model.clone())
    }

    /// Point the backend at another API root (proxies, local fakes)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Configured model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the API URL for a model method; the key travels in a header
    fn build_url(&self, method: &str) -> String {
        format!("{}/models/{}:{method}", self.base_url, self.model)
    }

    fn build_request(prompt: &str, safety: &SafetySettings) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts: vec![ContentPart {
                    text: prompt.to_owned(),
                }],
            }],
            safety_settings: safety.settings.clone(),
            generation_config: GenerationConfig { candidate_count: 1 },
        }
    }

    /// Extract the candidate text, classifying safety blocks and empty output
    fn extract_text(response: GeminiResponse) -> Result<String, GenerationError> {
        if let Some(error) = response.error {
            return Err(GenerationError::unknown(format!(
                "Gemini API error: {}",
                error.message
            )));
        }

        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(GenerationError::safety_blocked(format!(
                "Prompt blocked: {reason}"
            )));
        }

        let candidate = response
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or_else(|| GenerationError::unknown("No candidates in Gemini response"))?;

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|reason| SAFETY_FINISH_REASONS.contains(reason))
        {
            return Err(GenerationError::safety_blocked(format!(
                "Candidate blocked: {reason}"
            )));
        }

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();
        Ok(text)
    }

    /// Map a non-success HTTP status to an error kind
    fn map_api_error(status: u16, response_text: &str) -> GenerationError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);
        let lower = message.to_lowercase();

        match status {
            429 => GenerationError::rate_limited(Self::extract_quota_message(&message)),
            401 | 403 => GenerationError::auth(message),
            400 if lower.contains("api key") => GenerationError::auth(message),
            502..=504 => GenerationError::network(format!("Gemini unavailable ({status}): {message}")),
            _ if lower.contains("quota") => GenerationError::rate_limited(message),
            _ => GenerationError::unknown(format!("Gemini API error ({status}): {message}")),
        }
    }

    /// Condense a quota message to its retry hint
    ///
    /// Example input: "... Please retry in 6.406453963s."
    fn extract_quota_message(message: &str) -> String {
        const RETRY_HINT: &str = "Please retry in ";
        if let Some(retry_pos) = message.find(RETRY_HINT) {
            let after_prefix = &message[retry_pos + RETRY_HINT.len()..];
            if let Some(s_pos) = after_prefix.find('s') {
                if let Ok(seconds) = after_prefix[..s_pos].parse::<f64>() {
                    let seconds_int = seconds.ceil() as u64;
                    return format!("Gemini quota exceeded, retry in {seconds_int} seconds");
                }
            }
        }
        format!("Gemini quota exceeded: {message}")
    }

    fn map_transport_error(error: reqwest::Error) -> GenerationError {
        let error = error.without_url();
        if error.is_timeout() {
            GenerationError::network(format!("Gemini request timed out: {error}"))
        } else {
            GenerationError::network(format!("HTTP request failed: {error}"))
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip(self, prompt, safety), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(
        &self,
        prompt: &str,
        safety: &SafetySettings,
    ) -> Result<String, GenerationError> {
        let url = self.build_url("generateContent");
        let request = Self::build_request(prompt, safety);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(Self::map_transport_error)?;

        if !status.is_success() {
            warn!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response");
                GenerationError::unknown(format!("Failed to parse Gemini response: {e}"))
            })?;

        let text = Self::extract_text(gemini_response)?;
        debug!(response_len = text.len(), "Received Gemini response");
        Ok(text)
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn health_check(&self) -> Result<(), GenerationError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Gemini health check failed");
        Err(Self::map_api_error(status.as_u16(), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GenerationErrorKind;
    use crate::llm::BlockThreshold;

    fn parse(body: &str) -> Result<String, GenerationError> {
        let response: GeminiResponse = serde_json::from_str(body)
            .map_err(|e| GenerationError::unknown(e.to_string()))?;
        GeminiBackend::extract_text(response)
    }

    #[test]
    fn test_request_carries_safety_settings() -> Result<(), serde_json::Error> {
        let safety = SafetySettings::uniform(BlockThreshold::BlockLowAndAbove);
        let json = serde_json::to_value(GeminiBackend::build_request("hi", &safety))?;
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["safetySettings"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_LOW_AND_ABOVE");

        let json = serde_json::to_value(GeminiBackend::build_request(
            "hi",
            &SafetySettings::backend_default(),
        ))?;
        assert!(json.get("safetySettings").is_none());
        Ok(())
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"สวัสดี "},{"text":"ครับ"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(parse(body).ok().as_deref(), Some("สวัสดี ครับ"));
    }

    #[test]
    fn test_safety_blocks_classified() {
        let prompt_blocked = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(
            parse(prompt_blocked).err().map(|e| e.kind),
            Some(GenerationErrorKind::SafetyBlocked)
        );

        let candidate_blocked = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert_eq!(
            parse(candidate_blocked).err().map(|e| e.kind),
            Some(GenerationErrorKind::SafetyBlocked)
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (429, "{}", GenerationErrorKind::RateLimited),
            (401, "{}", GenerationErrorKind::Auth),
            (
                400,
                r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#,
                GenerationErrorKind::Auth,
            ),
            (503, "{}", GenerationErrorKind::Network),
            (500, "{}", GenerationErrorKind::Unknown),
        ];
        for (status, body, kind) in cases {
            assert_eq!(GeminiBackend::map_api_error(status, body).kind, kind, "{status}");
        }
    }

    #[test]
    fn test_quota_message_rounds_up() {
        let message = GeminiBackend::extract_quota_message("Quota hit. Please retry in 6.4s.");
        assert_eq!(message, "Gemini quota exceeded, retry in 7 seconds");
    }

    #[test]
    fn test_debug_redacts_key() {
        let backend = GeminiBackend::new("secret-key", "gemini-1.5-flash");
        let rendered = format!("{backend:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("gemini-1.5-flash"));
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_leak_key() {
        let backend = GeminiBackend::new("secret-key", "gemini-1.5-flash")
            .with_base_url("http://127.0.0.1:1");
        assert!(!backend.build_url("generateContent").contains("secret-key"));

        let error = backend
            .generate("hello", &SafetySettings::backend_default())
            .await
            .err();
        assert_eq!(error.as_ref().map(|e| e.kind), Some(GenerationErrorKind::Network));
        assert!(error.is_some_and(|e| !e.to_string().contains("secret-key")));

        let error = backend.health_check().await.err();
        assert!(error.is_some_and(|e| !e.to_string().contains("secret-key")));
    }
}
