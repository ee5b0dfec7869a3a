// ABOUTME: Generative backend abstraction for persona response generation
// ABOUTME: Defines the backend contract, per-call content-safety settings and prompt builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Generative Backend Interface
//!
//! The orchestrator only needs "prompt in, text out". Every call carries its
//! own [`SafetySettings`] so thresholds can differ between the main generation
//! and the improve pass.
//!
//! ## Example
//!
//! ```rust,no_run
//! use persona_chat_server::llm::{GenerativeBackend, SafetySettings};
//!
//! async fn example(backend: &dyn GenerativeBackend) {
//!     let reply = backend
//!         .generate("You are Velorien. Say hello.", &SafetySettings::default())
//!         .await;
//!     println!("{reply:?}");
//! }
//! ```

mod gemini;
/// Prompt builders for generation and improvement
pub mod prompts;

pub use gemini::GeminiBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

// ============================================================================
// Safety Settings
// ============================================================================

/// Content-safety categories enforced by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    /// Harassment
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Probability level at and above which content is blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    /// Block nothing
    BlockNone,
    /// Block only high-probability content
    BlockOnlyHigh,
    /// Block medium and high
    BlockMediumAndAbove,
    /// Block low, medium and high
    BlockLowAndAbove,
}

/// Threshold for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// Category
    pub category: HarmCategory,
    /// Block threshold
    pub threshold: BlockThreshold,
}

/// Per-call content-safety configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySettings {
    /// One entry per enforced category
    pub settings: Vec<SafetySetting>,
}

impl SafetySettings {
    /// Same threshold for all four categories
    #[must_use]
    pub fn uniform(threshold: BlockThreshold) -> Self {
        let settings = [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold,
        })
        .collect();
        Self { settings }
    }

    /// No explicit thresholds; backend defaults apply
    #[must_use]
    pub const fn backend_default() -> Self {
        Self {
            settings: Vec::new(),
        }
    }

    /// Threshold configured for `category`
    #[must_use]
    pub fn threshold(&self, category: HarmCategory) -> Option<BlockThreshold> {
        self.settings
            .iter()
            .find(|setting| setting.category == category)
            .map(|setting| setting.threshold)
    }
}

impl Default for SafetySettings {
    /// Block medium and above in every category
    fn default() -> Self {
        Self::uniform(BlockThreshold::BlockMediumAndAbove)
    }
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Text generation backend
///
/// Implementations classify every failure into a [`GenerationError`] kind;
/// the caller owns retries and fallbacks.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Backend identifier used in logs
    fn name(&self) -> &'static str;

    /// Generate text for `prompt` under `safety`
    async fn generate(&self, prompt: &str, safety: &SafetySettings)
        -> Result<String, GenerationError>;

    /// Check that the backend is reachable and the credentials are accepted
    async fn health_check(&self) -> Result<(), GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_safety_covers_all_categories() {
        let settings = SafetySettings::default();
        assert_eq!(settings.settings.len(), 4);
        assert_eq!(
            settings.threshold(HarmCategory::HateSpeech),
            Some(BlockThreshold::BlockMediumAndAbove)
        );
        assert_eq!(
            SafetySettings::backend_default().threshold(HarmCategory::Harassment),
            None
        );
    }

    #[test]
    fn test_safety_setting_wire_names() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(SafetySetting {
            category: HarmCategory::SexuallyExplicit,
            threshold: BlockThreshold::BlockOnlyHigh,
        })?;
        assert_eq!(json["category"], "HARM_CATEGORY_SEXUALLY_EXPLICIT");
        assert_eq!(json["threshold"], "BLOCK_ONLY_HIGH");
        Ok(())
    }
}
