// ABOUTME: Static per-persona style profiles consumed by the response validator
// ABOUTME: Language mode, register, target length, emoji usage and personality marker vocabularies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

use crate::models::{Formality, Language, ResponseLength};

/// How often a persona uses emoji
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmojiUsage {
    /// Never
    None,
    /// Rarely
    Minimal,
    /// A few per message
    Moderate,
    /// Liberally
    Frequent,
}

/// Words that signal (or contradict) a persona's voice
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonalityMarkers {
    /// Words the persona tends to use
    pub positive: Vec<String>,
    /// Words the persona should not use
    pub negative: Vec<String>,
}

/// Style profile of one persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Owning persona; filled from the bundle when omitted in the style block
    #[serde(default)]
    pub persona_id: String,
    /// Expected language mode
    pub language: Language,
    /// Expected register
    pub formality: Formality,
    /// Target response length class
    pub response_length: ResponseLength,
    /// Emoji usage class
    pub emoji_usage: EmojiUsage,
    /// Free-form trait labels
    #[serde(default)]
    pub traits: Vec<String>,
    /// Marker vocabularies; personas without them get a neutral consistency score
    #[serde(default)]
    pub markers: Option<PersonalityMarkers>,
}

impl EmojiUsage {
    /// Lowercase label used in prompts
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "no",
            Self::Minimal => "minimal",
            Self::Moderate => "moderate",
            Self::Frequent => "frequent",
        }
    }
}
