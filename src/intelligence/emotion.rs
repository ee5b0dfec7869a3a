// ABOUTME: Scored emotion classifier over separate Thai and English keyword tables
// ABOUTME: Produces primary and secondary emotions, intensity, confidence, sentiment and topics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{Classifier, EmotionAnalysis, Intensity, Sentiment};
use crate::models::{Emotion, Topic};

/// Emotions scored by the full classifier, in tie-break order
const SCORED_EMOTIONS: [Emotion; 7] = [
    Emotion::Happy,
    Emotion::Sad,
    Emotion::Angry,
    Emotion::Anxious,
    Emotion::Excited,
    Emotion::Calm,
    Emotion::Confused,
];

// Thai keywords match against the raw text, English ones against the lowercased text.
const THAI_KEYWORDS: [(Emotion, &[&str]); 7] = [
    (
        Emotion::Happy,
        &["ดีใจ", "สุข", "ยินดี", "สนุก", "ชอบ", "รัก", "ขอบคุณ", "ขอบใจ", "ดี", "เยี่ยม", "สุดยอด"],
    ),
    (
        Emotion::Sad,
        &["เศร้า", "เสียใจ", "หดหู่", "ท้อ", "เหนื่อย", "เบื่อ", "เหงา", "โดดเดี่ยว", "สิ้นหวัง"],
    ),
    (
        Emotion::Angry,
        &["โกรธ", "โมโห", "หงุดหงิด", "รำคาญ", "ไม่พอใจ", "แย่", "เลว", "เกลียด"],
    ),
    (
        Emotion::Anxious,
        &["กังวล", "เครียด", "วิตก", "กลัว", "ไม่แน่ใจ", "ลังเล", "สับสน"],
    ),
    (
        Emotion::Excited,
        &["ตื่นเต้น", "คาดหวัง", "อยาก", "รอ", "จะ", "กำลังจะ"],
    ),
    (
        Emotion::Calm,
        &["สงบ", "เย็น", "ผ่อนคลาย", "สบาย", "โอเค", "ได้", "ไม่เป็นไร"],
    ),
    (
        Emotion::Confused,
        &["ไม่เข้าใจ", "งง", "สับสน", "ไม่รู้", "อะไร", "ยังไง", "ทำไม"],
    ),
];

const ENGLISH_KEYWORDS: [(Emotion, &[&str]); 7] = [
    (
        Emotion::Happy,
        &[
            "happy", "joy", "excited", "love", "like", "great", "awesome", "wonderful", "amazing",
            "thank",
        ],
    ),
    (
        Emotion::Sad,
        &["sad", "depressed", "lonely", "tired", "bored", "hopeless", "miserable", "upset"],
    ),
    (
        Emotion::Angry,
        &["angry", "mad", "furious", "hate", "annoyed", "frustrated", "terrible", "awful"],
    ),
    (
        Emotion::Anxious,
        &["worried", "anxious", "stressed", "afraid", "scared", "nervous", "uncertain"],
    ),
    (
        Emotion::Excited,
        &["excited", "looking forward", "can't wait", "anticipate", "hope"],
    ),
    (
        Emotion::Calm,
        &["calm", "relaxed", "okay", "fine", "alright", "good"],
    ),
    (
        Emotion::Confused,
        &["confused", "don't understand", "what", "how", "why", "unsure"],
    ),
];

const TOPIC_KEYWORDS: [(Topic, &[&str]); 8] = [
    (Topic::Work, &["งาน", "work", "job", "office", "company", "boss"]),
    (
        Topic::Study,
        &["เรียน", "study", "school", "university", "exam", "test", "homework"],
    ),
    (
        Topic::Family,
        &["ครอบครัว", "family", "พ่อ", "แม่", "mom", "dad", "parent"],
    ),
    (Topic::Friends, &["เพื่อน", "friend", "เพื่อนๆ", "friends"]),
    (
        Topic::Health,
        &["สุขภาพ", "health", "ป่วย", "sick", "doctor", "hospital"],
    ),
    (
        Topic::Love,
        &["ความรัก", "love", "แฟน", "boyfriend", "girlfriend", "relationship"],
    ),
    (
        Topic::Money,
        &["เงิน", "money", "cash", "salary", "income", "expensive", "cheap"],
    ),
    (
        Topic::Future,
        &["อนาคต", "future", "dream", "goal", "plan", "ambition"],
    ),
];

/// Topics mentioned in `text`, deduplicated, in taxonomy order
#[must_use]
pub fn detect_topics(text: &str) -> Vec<Topic> {
    let lower = text.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| lower.contains(keyword) || text.contains(keyword))
        })
        .map(|(topic, _)| *topic)
        .collect()
}

/// Hits per scored emotion, in [`SCORED_EMOTIONS`] order
fn score_emotions(text: &str) -> [u32; 7] {
    let lower = text.to_lowercase();
    let mut scores = [0_u32; 7];
    for (slot, emotion) in SCORED_EMOTIONS.iter().enumerate() {
        let thai_hits = THAI_KEYWORDS
            .iter()
            .filter(|(e, _)| e == emotion)
            .flat_map(|(_, keywords)| keywords.iter())
            .filter(|keyword| text.contains(*keyword))
            .count();
        let english_hits = ENGLISH_KEYWORDS
            .iter()
            .filter(|(e, _)| e == emotion)
            .flat_map(|(_, keywords)| keywords.iter())
            .filter(|keyword| lower.contains(*keyword))
            .count();
        scores[slot] = (thai_hits + english_hits) as u32;
    }
    scores
}

/// Full keyword classifier
///
/// Scores every emotion by keyword hits in both languages; the primary
/// emotion is the strict maximum, ties going to the earlier emotion.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl Classifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn classify(&self, text: &str) -> EmotionAnalysis {
        let scores = score_emotions(text);

        let mut primary = Emotion::Neutral;
        let mut max_score = 0;
        for (emotion, score) in SCORED_EMOTIONS.iter().zip(scores) {
            if score > max_score {
                max_score = score;
                primary = *emotion;
            }
        }

        let total: u32 = scores.iter().sum();
        let confidence = if total > 0 {
            (f64::from(max_score) / f64::from(total)).min(1.0)
        } else {
            0.0
        };

        let mut runners_up: Vec<(Emotion, u32)> = SCORED_EMOTIONS
            .iter()
            .zip(scores)
            .filter(|(emotion, score)| **emotion != primary && *score > 0)
            .map(|(emotion, score)| (*emotion, score))
            .collect();
        runners_up.sort_by(|a, b| b.1.cmp(&a.1));

        EmotionAnalysis {
            emotion: primary,
            intensity: Intensity::from_score(max_score),
            confidence,
            secondary_emotions: runners_up.into_iter().take(2).map(|(e, _)| e).collect(),
            sentiment: Sentiment::of(primary),
            topics: detect_topics(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_hits_is_neutral() {
        let analysis = KeywordClassifier.classify("1234 !!");
        assert_eq!(analysis.emotion, Emotion::Neutral);
        assert_eq!(analysis.intensity, Intensity::Low);
        assert!(analysis.confidence.abs() < f64::EPSILON);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert!(analysis.secondary_emotions.is_empty());
    }

    #[test]
    fn test_english_sadness() {
        let analysis = KeywordClassifier.classify("I feel so sad and tired, totally hopeless");
        assert_eq!(analysis.emotion, Emotion::Sad);
        assert_eq!(analysis.intensity, Intensity::High);
        assert_eq!(analysis.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_tie_goes_to_declaration_order() {
        // one happy hit ("great") and one angry hit ("mad")
        let analysis = KeywordClassifier.classify("mad but great");
        assert_eq!(analysis.emotion, Emotion::Happy);
        assert_eq!(analysis.secondary_emotions, vec![Emotion::Angry]);
        assert!((analysis.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_topics_deduplicated() {
        let topics = detect_topics("my boss at work and my job, also my mom");
        assert_eq!(topics, vec![Topic::Work, Topic::Family]);
    }
}
