// ABOUTME: Keyword heuristics over user and persona text
// ABOUTME: Full and light emotion classifiers behind one trait, plus the response validator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Intelligence Module
//!
//! Fixed keyword taxonomies, no trained models and no I/O:
//!
//! - [`KeywordClassifier`]: scored emotion analysis with intensity, confidence,
//!   secondary emotions and topics
//! - [`LightClassifier`]: first-match emotion and context labels used by the
//!   template path
//! - [`ResponseValidator`]: style scoring and quality metrics for generated text
//!
//! Both classifiers implement [`Classifier`] and are kept separate on purpose:
//! their call sites depend on their different precision.

/// Scored multi-language emotion classifier
pub mod emotion;
/// First-match emotion and context detection
pub mod light;
/// Word-set and script helpers shared by the heuristics
pub mod text;
/// Response scoring against persona style profiles
pub mod validator;

pub use emotion::{detect_topics, KeywordClassifier};
pub use light::LightClassifier;
pub use validator::{QualityMetrics, ResponseValidator, ValidationResult};

use serde::{Deserialize, Serialize};

use crate::models::{Emotion, Topic};

/// Strength of the detected emotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// No keyword hits
    Low,
    /// One or two hits for the primary emotion
    Medium,
    /// Three or more hits
    High,
}

impl Intensity {
    /// Bucket for the primary emotion's hit count
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        match score {
            0 => Self::Low,
            1 | 2 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// Polarity of the primary emotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Happy, excited, calm, grateful, encouraging
    Positive,
    /// Sad, angry, anxious, confused, lonely, stressed
    Negative,
    /// Everything else
    Neutral,
}

impl Sentiment {
    /// Fixed lookup from emotion to polarity
    #[must_use]
    pub const fn of(emotion: Emotion) -> Self {
        match emotion {
            Emotion::Happy
            | Emotion::Excited
            | Emotion::Calm
            | Emotion::Grateful
            | Emotion::Encouraging => Self::Positive,
            Emotion::Sad
            | Emotion::Angry
            | Emotion::Anxious
            | Emotion::Confused
            | Emotion::Lonely
            | Emotion::Stressed => Self::Negative,
            Emotion::Analytical | Emotion::Neutral => Self::Neutral,
        }
    }
}

/// Output of a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    /// Highest scoring emotion, `Neutral` without hits
    pub emotion: Emotion,
    /// Hit-count bucket of the primary emotion
    pub intensity: Intensity,
    /// Primary hits over all hits, 0 without hits
    pub confidence: f64,
    /// Up to two runner-up emotions, strongest first
    pub secondary_emotions: Vec<Emotion>,
    /// Polarity of the primary emotion
    pub sentiment: Sentiment,
    /// Topics mentioned, deduplicated in taxonomy order
    pub topics: Vec<Topic>,
}

/// A named emotion classification strategy
///
/// Implementations are pure: the same text always yields the same analysis.
pub trait Classifier: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Analyze `text`
    fn classify(&self, text: &str) -> EmotionAnalysis;
}
