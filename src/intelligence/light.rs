// ABOUTME: First-match emotion, context and user-mood detection for the template path
// ABOUTME: Ordered substring checks; coarser than the scored classifier on purpose
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{Classifier, EmotionAnalysis, Intensity, Sentiment};
use crate::models::{Emotion, MessageContext};

/// Ordered emotion rules; the first rule with any matching keyword wins
const EMOTION_RULES: [(&[&str], Emotion); 14] = [
    (&["เหงา"], Emotion::Lonely),
    (&["เครียด", "กดดัน"], Emotion::Stressed),
    (&["ขอบคุณ", "ขอบใจ"], Emotion::Grateful),
    (&["สวัสดี", "หวัดดี"], Emotion::Neutral),
    (&["เศร้า", "เสียใจ"], Emotion::Sad),
    (&["โกรธ", "โมโห"], Emotion::Angry),
    (&["ดีใจ", "สุขใจ"], Emotion::Happy),
    (&["lonely", "alone"], Emotion::Lonely),
    (&["stress", "worried"], Emotion::Stressed),
    (&["thank"], Emotion::Grateful),
    (&["hello", "hi"], Emotion::Neutral),
    (&["sad", "depressed"], Emotion::Sad),
    (&["angry", "mad"], Emotion::Angry),
    (&["happy", "excited"], Emotion::Happy),
];

const CONTEXT_RULES: [(&[&str], MessageContext); 6] = [
    (&["เหงา", "lonely"], MessageContext::UserExpressesLoneliness),
    (&["เครียด", "stress"], MessageContext::UserExpressesStress),
    (&["ขอบคุณ", "thank"], MessageContext::UserExpressesGratitude),
    (&["สวัสดี", "hello"], MessageContext::UserGreets),
    (&["ช่วย", "help"], MessageContext::UserAsksForHelp),
    (&["คิด", "think"], MessageContext::UserAsksForAdvice),
];

const USER_MOOD_RULES: [(&[&str], Emotion); 5] = [
    (&["ดีใจ", "happy"], Emotion::Happy),
    (&["เศร้า", "sad"], Emotion::Sad),
    (&["โกรธ", "angry"], Emotion::Angry),
    (&["เครียด", "stress"], Emotion::Stressed),
    (&["เหงา", "lonely"], Emotion::Lonely),
];

fn first_match<T: Copy>(text: &str, rules: &[(&[&str], T)]) -> Option<T> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(_, label)| *label)
}

/// Light classifier used by the generation pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct LightClassifier;

impl LightClassifier {
    /// Single emotion label, `Neutral` when nothing matches
    #[must_use]
    pub fn detect_emotion(text: &str) -> Emotion {
        first_match(text, &EMOTION_RULES).unwrap_or(Emotion::Neutral)
    }

    /// Single context label; falls back on conversation length when no keyword matches
    #[must_use]
    pub fn detect_context(text: &str, history_len: usize) -> MessageContext {
        first_match(text, &CONTEXT_RULES).unwrap_or(match history_len {
            0 => MessageContext::UserGreets,
            1 | 2 => MessageContext::UserAsksForHelp,
            _ => MessageContext::UserAsksForAdvice,
        })
    }

    /// Mood of the current message as used in contextual conditions
    #[must_use]
    pub fn detect_user_mood(text: &str) -> Emotion {
        first_match(text, &USER_MOOD_RULES).unwrap_or(Emotion::Neutral)
    }
}

impl Classifier for LightClassifier {
    fn name(&self) -> &'static str {
        "light"
    }

    fn classify(&self, text: &str) -> EmotionAnalysis {
        let emotion = Self::detect_emotion(text);
        let matched = emotion != Emotion::Neutral;
        EmotionAnalysis {
            emotion,
            intensity: if matched {
                Intensity::Medium
            } else {
                Intensity::Low
            },
            confidence: if matched { 1.0 } else { 0.0 },
            secondary_emotions: Vec::new(),
            sentiment: Sentiment::of(emotion),
            topics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lonely_thai() {
        assert_eq!(LightClassifier::detect_emotion("เหงาจัง"), Emotion::Lonely);
        assert_eq!(
            LightClassifier::detect_context("เหงาจัง", 4),
            MessageContext::UserExpressesLoneliness
        );
    }

    #[test]
    fn test_thai_rules_win_over_english() {
        assert_eq!(
            LightClassifier::detect_emotion("so sad, ขอบคุณนะ"),
            Emotion::Grateful
        );
    }

    #[test]
    fn test_context_falls_back_on_history_length() {
        assert_eq!(
            LightClassifier::detect_context("...", 0),
            MessageContext::UserGreets
        );
        assert_eq!(
            LightClassifier::detect_context("...", 2),
            MessageContext::UserAsksForHelp
        );
        assert_eq!(
            LightClassifier::detect_context("...", 3),
            MessageContext::UserAsksForAdvice
        );
    }

    #[test]
    fn test_user_mood() {
        assert_eq!(LightClassifier::detect_user_mood("I'm so STRESSED"), Emotion::Stressed);
        assert_eq!(LightClassifier::detect_user_mood("ok"), Emotion::Neutral);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let first = LightClassifier.classify("thank you");
        let second = LightClassifier.classify("thank you");
        assert_eq!(first, second);
        assert_eq!(first.emotion, Emotion::Grateful);
        assert_eq!(first.sentiment, Sentiment::Positive);
    }
}
