// ABOUTME: Scores candidate responses against a persona style profile and recent history
// ABOUTME: Additive-penalty validation, independent quality metrics and improvement suggestions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Response Validation
//!
//! Two independent scoring paths:
//!
//! - [`ResponseValidator::validate`] starts at 100 and subtracts a fixed
//!   penalty per failed check; a response is valid at 60 or above
//! - [`ResponseValidator::quality_metrics`] rates naturalness, personality
//!   consistency, relevance and originality and averages them
//!
//! The two paths share the personality check but are not expected to agree.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::text::{jaccard, latin_run_count, thai_char_count, word_count};
use crate::constants::limits::{SIMILARITY_THRESHOLD, VALID_SCORE};
use crate::models::{Language, ResponseLength};
use crate::personas::StyleProfile;

/// Stock phrases that make replies feel canned
const REPETITIVE_PHRASES: [&str; 8] = [
    "ค่อยๆ",
    "เข้าใจ",
    "ไม่ต้องกดดัน",
    "ผมเชื่อในตัวคุณ",
    "ผมอยู่ตรงนี้เสมอ",
    "ทุกอย่างจะผ่านไป",
    "ลอง",
    "ครับ",
];

/// Filler interjections
const GENERIC_PHRASES: [&str; 10] = [
    "โอ้โห", "โอ้", "อืม", "เอ่อ", "อ่า", "oh", "well", "um", "uh", "hmm",
];

/// Connectives that make chat text sound robotic
const FORMAL_CONNECTIVES: [&str; 5] = ["therefore", "thus", "hence", "consequently", "furthermore"];

/// Personality score for personas without marker vocabularies
const UNMARKED_PERSONALITY_SCORE: f64 = 80.0;

static EMOJI_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}]",
    )
    .ok()
});

static ELLIPSIS_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\.{3,}").ok());

static CREATIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)metaphor|simile|analogy",
        r"(?i)story|example|experience",
        r"(?i)imagine|suppose|consider",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Outcome of [`ResponseValidator::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `score >= 60`
    pub is_valid: bool,
    /// 0 to 100
    pub score: u32,
    /// One entry per failed check
    pub issues: Vec<String>,
    /// One fixed suggestion per failed check
    pub suggestions: Vec<String>,
}

/// Outcome of [`ResponseValidator::quality_metrics`], each in `0..=100`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Conversational tone
    pub naturalness: f64,
    /// Marker vocabulary usage
    pub personality_consistency: f64,
    /// Word overlap with the user message
    pub relevance: f64,
    /// Vocabulary variety plus creative constructs
    pub originality: f64,
    /// Rounded mean of the four
    pub overall: f64,
}

/// Stateless response scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    /// Score `response` against `style` and the texts of previous turns
    #[must_use]
    pub fn validate(
        response: &str,
        style: &StyleProfile,
        _user_message: &str,
        history: &[String],
    ) -> ValidationResult {
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();
        let mut penalty = 0_u32;

        let repetitive = count_phrases(response, &REPETITIVE_PHRASES);
        if repetitive > 2 {
            issues.push(format!("Too many repetitive phrases ({repetitive})"));
            suggestions.push("Vary your vocabulary and sentence structure".to_owned());
            penalty += 20;
        }

        let generic = count_phrases(response, &GENERIC_PHRASES);
        if generic > 1 {
            issues.push(format!("Contains generic filler phrases ({generic})"));
            suggestions.push("Use more natural, character-specific language".to_owned());
            penalty += 15;
        }

        if personality_score(response, style) < 70.0 {
            issues.push("Response doesn't match character personality".to_owned());
            suggestions.push(format!("Stay true to {}'s personality", style.persona_id));
            penalty += 25;
        }

        if length_score(response, style.response_length) < 70.0 {
            issues.push("Response length doesn't match character style".to_owned());
            suggestions.push(format!("Adjust response length for {}", style.persona_id));
            penalty += 10;
        }

        if history_repetition(response, history) > SIMILARITY_THRESHOLD {
            issues.push("Response too similar to previous messages".to_owned());
            suggestions.push("Make your response more unique and fresh".to_owned());
            penalty += 15;
        }

        if language_score(response, style.language) < 80.0 {
            issues.push("Language doesn't match character style".to_owned());
            suggestions.push(format!("Use {} language appropriately", style.language));
            penalty += 15;
        }

        let score = 100_u32.saturating_sub(penalty);
        ValidationResult {
            is_valid: score >= VALID_SCORE,
            score,
            issues,
            suggestions,
        }
    }

    /// Independent quality rating of `response`
    #[must_use]
    pub fn quality_metrics(response: &str, style: &StyleProfile, user_message: &str) -> QualityMetrics {
        let naturalness = naturalness(response);
        let personality_consistency = personality_score(response, style);
        let relevance = jaccard(response, user_message) * 100.0;
        let originality = originality(response);
        let overall =
            ((naturalness + personality_consistency + relevance + originality) / 4.0).round();

        QualityMetrics {
            naturalness,
            personality_consistency,
            relevance,
            originality,
            overall,
        }
    }

    /// Softer, history-free hints for rewriting `response`
    #[must_use]
    pub fn suggest_improvements(response: &str, style: &StyleProfile) -> Vec<String> {
        let mut suggestions = Vec::new();
        if count_phrases(response, &REPETITIVE_PHRASES) > 1 {
            suggestions
                .push("Try using different words instead of repeating the same phrases".to_owned());
        }
        if count_phrases(response, &GENERIC_PHRASES) > 0 {
            suggestions.push("Replace generic phrases with more character-specific language".to_owned());
        }
        if personality_score(response, style) < 70.0 {
            suggestions.push(format!(
                "Make the response more consistent with {}'s personality",
                style.persona_id
            ));
        }
        if language_score(response, style.language) < 80.0 {
            suggestions.push(format!(
                "Adjust the language to match {}'s style",
                style.persona_id
            ));
        }
        suggestions
    }
}

/// How many of `phrases` occur at least once
fn count_phrases(response: &str, phrases: &[&str]) -> usize {
    let lower = response.to_lowercase();
    phrases
        .iter()
        .filter(|phrase| lower.contains(&phrase.to_lowercase()))
        .count()
}

fn personality_score(response: &str, style: &StyleProfile) -> f64 {
    let Some(markers) = &style.markers else {
        return UNMARKED_PERSONALITY_SCORE;
    };
    let lower = response.to_lowercase();
    let ratio = |words: &[String]| {
        if words.is_empty() {
            return 0.0;
        }
        let hits = words
            .iter()
            .filter(|word| lower.contains(&word.to_lowercase()))
            .count();
        hits as f64 / words.len() as f64
    };

    let score = ratio(&markers.positive).mul_add(100.0, -(ratio(&markers.negative) * 50.0));
    score.clamp(0.0, 100.0)
}

/// Word-count fit against the target length; empty text counts as zero words
fn length_score(response: &str, target: ResponseLength) -> f64 {
    let words = word_count(response) as f64;
    let score = match target {
        ResponseLength::Short if words <= 20.0 => 100.0,
        ResponseLength::Short => 2.0f64.mul_add(-(words - 20.0), 100.0),
        ResponseLength::Medium if (15.0..=50.0).contains(&words) => 100.0,
        ResponseLength::Medium => 2.0f64.mul_add(-(words - 32.0).abs(), 100.0),
        ResponseLength::Long if words >= 30.0 => 100.0,
        ResponseLength::Long => 2.0f64.mul_add(-(30.0 - words), 100.0),
    };
    score.max(0.0)
}

/// Mean word-set similarity between `response` and each history text
fn history_repetition(response: &str, history: &[String]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let total: f64 = history.iter().map(|past| jaccard(response, past)).sum();
    total / history.len() as f64
}

fn language_score(response: &str, language: Language) -> f64 {
    let (thai, english) = (thai_char_count(response), latin_run_count(response));
    if thai + english == 0 {
        return 80.0;
    }
    let (thai, english) = (thai as f64, english as f64);
    let total = thai + english;
    match language {
        Language::Thai => thai / total * 100.0,
        Language::English => english / total * 100.0,
        Language::Mixed => (thai.min(english) / thai.max(english) * 100.0).min(100.0),
    }
}

fn naturalness(response: &str) -> f64 {
    let lower = response.to_lowercase();
    let formal = FORMAL_CONNECTIVES
        .iter()
        .filter(|word| lower.contains(*word))
        .count() as f64;
    let mut score = formal.mul_add(-10.0, 100.0);

    if response.contains('?') {
        score += 5.0;
    }
    if EMOJI_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(response))
    {
        score += 5.0;
    }
    if ELLIPSIS_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(response))
    {
        score += 3.0;
    }
    score.clamp(0.0, 100.0)
}

/// Share of distinct words plus creative-language bonuses
///
/// Empty text has no words and scores 0. Generated text is rejected as empty
/// before it reaches the validator.
fn originality(response: &str) -> f64 {
    let words: Vec<String> = response.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&String> = words.iter().collect();
    let mut score = unique.len() as f64 / words.len() as f64 * 100.0;
    for pattern in CREATIVE_PATTERNS.iter() {
        if pattern.is_match(response) {
            score += 10.0;
        }
    }
    score.clamp(0.0, 100.0)
}
