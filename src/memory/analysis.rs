// ABOUTME: Pure derivations over a conversation window
// ABOUTME: Mood, topics, user preferences, common topics and prompt personalization notes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::Write;

use crate::constants::limits::{MOOD_WINDOW, PREFERENCE_WINDOW, RECENT_TOPICS, TOPIC_WINDOW};
use crate::intelligence::text::{latin_letter_count, thai_char_count, word_count};
use crate::models::{
    ConversationMessage, ConversationMood, ConversationState, Emotion, Formality, Language,
    RelationshipLevel, ResponseLength, Sender, Topic, UserPreferences,
};

/// Topic keyword pairs scanned over stored messages
const TOPIC_KEYWORDS: [(&str, &str, Topic); 8] = [
    ("งาน", "work", Topic::Work),
    ("เรียน", "study", Topic::Study),
    ("ครอบครัว", "family", Topic::Family),
    ("เพื่อน", "friend", Topic::Friends),
    ("สุขภาพ", "health", Topic::Health),
    ("ความรัก", "love", Topic::Love),
    ("เงิน", "money", Topic::Money),
    ("อนาคต", "future", Topic::Future),
];

const POLITE_MARKERS: [&str; 5] = ["ครับ", "ค่ะ", "คะ", "please", "thank"];
const FORMAL_MARKERS: [&str; 5] = ["ท่าน", "กรุณา", "sir", "madam", "dear"];

/// Share of script letters above which a language is considered dominant
const DOMINANT_SCRIPT_SHARE: f64 = 0.7;

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Topics of one message, in taxonomy order
fn message_topics(text: &str) -> impl Iterator<Item = Topic> + '_ {
    let lower = text.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .filter(move |(thai, english, _)| lower.contains(thai) || lower.contains(english))
        .map(|(_, _, topic)| *topic)
}

/// Mood of the last five messages by emotion polarity
#[must_use]
pub fn conversation_mood(messages: &[ConversationMessage]) -> ConversationMood {
    let (mut positive, mut negative) = (0_usize, 0_usize);
    for emotion in tail(messages, MOOD_WINDOW).iter().filter_map(|m| m.emotion) {
        match emotion {
            Emotion::Happy | Emotion::Excited | Emotion::Grateful => positive += 1,
            Emotion::Sad | Emotion::Angry | Emotion::Stressed | Emotion::Lonely => negative += 1,
            _ => {}
        }
    }

    if positive > negative {
        ConversationMood::Positive
    } else if negative > positive {
        ConversationMood::Negative
    } else if positive > 0 {
        ConversationMood::Mixed
    } else {
        ConversationMood::Neutral
    }
}

/// Distinct topics of the last ten messages, in order of first mention
#[must_use]
pub fn extract_topics(messages: &[ConversationMessage]) -> Vec<Topic> {
    let mut topics = Vec::new();
    for message in tail(messages, TOPIC_WINDOW) {
        for topic in message_topics(&message.text) {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }
    topics
}

/// Up to three topics by mention count across the last ten messages
#[must_use]
pub fn common_topics(messages: &[ConversationMessage]) -> Vec<Topic> {
    let mut counts: Vec<(Topic, usize)> = Vec::new();
    for message in tail(messages, TOPIC_WINDOW) {
        for topic in message_topics(&message.text) {
            match counts.iter_mut().find(|(t, _)| *t == topic) {
                Some((_, count)) => *count += 1,
                None => counts.push((topic, 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(RECENT_TOPICS)
        .map(|(topic, _)| topic)
        .collect()
}

/// Last three entries of the stored topic list
#[must_use]
pub fn recent_topics(topics: &[Topic]) -> Vec<Topic> {
    tail(topics, RECENT_TOPICS).to_vec()
}

/// Preferences inferred from the last ten user messages
///
/// Fields without evidence keep their `previous` value; `avoid_topics` is
/// only changed by explicit updates.
#[must_use]
pub fn infer_preferences(
    messages: &[ConversationMessage],
    previous: &UserPreferences,
) -> UserPreferences {
    let user_texts: Vec<&str> = messages
        .iter()
        .filter(|m| m.sender == Sender::User)
        .map(|m| m.text.as_str())
        .collect();
    let recent = tail(&user_texts, PREFERENCE_WINDOW);
    if recent.is_empty() {
        return previous.clone();
    }

    let thai: usize = recent.iter().map(|t| thai_char_count(t)).sum();
    let latin: usize = recent.iter().map(|t| latin_letter_count(t)).sum();
    let language = if thai + latin == 0 {
        previous.language
    } else {
        let thai_share = thai as f64 / (thai + latin) as f64;
        if thai_share > DOMINANT_SCRIPT_SHARE {
            Language::Thai
        } else if 1.0 - thai_share > DOMINANT_SCRIPT_SHARE {
            Language::English
        } else {
            Language::Mixed
        }
    };

    let mean_words =
        recent.iter().map(|t| word_count(t)).sum::<usize>() as f64 / recent.len() as f64;
    let response_length = if mean_words < 8.0 {
        ResponseLength::Short
    } else if mean_words < 25.0 {
        ResponseLength::Medium
    } else {
        ResponseLength::Long
    };

    let contains_any = |text: &str, markers: &[&str]| {
        let lower = text.to_lowercase();
        markers.iter().any(|marker| lower.contains(marker))
    };
    let polite_messages = recent
        .iter()
        .filter(|t| contains_any(t, &POLITE_MARKERS))
        .count();
    let formality = if recent.iter().any(|t| contains_any(t, &FORMAL_MARKERS)) {
        Formality::Formal
    } else if polite_messages * 2 >= recent.len() {
        Formality::Polite
    } else {
        Formality::Casual
    };

    let mut topics = Vec::new();
    for text in recent {
        for topic in message_topics(text) {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }

    UserPreferences {
        language,
        response_length,
        formality,
        topics,
        avoid_topics: previous.avoid_topics.clone(),
    }
}

/// Relationship, mood, topic and preference notes appended to generation prompts
#[must_use]
pub fn personalization_notes(state: &ConversationState) -> String {
    let mut notes = String::new();

    notes.push_str(match state.relationship_level {
        RelationshipLevel::Close => {
            "Note: You have a close relationship with this user. You can be more personal and reference past conversations."
        }
        RelationshipLevel::Familiar => {
            "Note: You are familiar with this user. You can be friendly and slightly more personal."
        }
        RelationshipLevel::New => "Note: This is a new user. Be welcoming and establish rapport.",
    });

    match state.conversation_mood {
        ConversationMood::Negative => notes.push_str(
            "\n\nThe user seems to be having a difficult time. Be extra supportive and understanding.",
        ),
        ConversationMood::Positive => notes.push_str(
            "\n\nThe conversation has been positive. Maintain this energy and be encouraging.",
        ),
        ConversationMood::Neutral | ConversationMood::Mixed => {}
    }

    let recent = recent_topics(&state.topics);
    if !recent.is_empty() {
        let joined: Vec<&str> = recent.iter().map(|t| t.as_str()).collect();
        let _ = write!(notes, "\n\nRecent conversation topics: {}", joined.join(", "));
    }

    if !state.user_preferences.avoid_topics.is_empty() {
        let avoided: Vec<&str> = state
            .user_preferences
            .avoid_topics
            .iter()
            .map(|t| t.as_str())
            .collect();
        let _ = write!(notes, "\n\nAvoid these topics: {}", avoided.join(", "));
    }

    let preferences = &state.user_preferences;
    let _ = write!(
        notes,
        "\n\nUser preferences: {} language, {} responses, {} tone",
        preferences.language, preferences.response_length, preferences.formality
    );
    notes
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn message(sender: Sender, text: &str, emotion: Option<Emotion>) -> ConversationMessage {
        ConversationMessage {
            id: text.to_owned(),
            timestamp: Utc::now(),
            sender,
            text: text.to_owned(),
            emotion,
            context: None,
        }
    }

    #[test]
    fn test_mood_window() {
        let mut messages = vec![
            message(Sender::User, "a", Some(Emotion::Happy)),
            message(Sender::User, "b", Some(Emotion::Happy)),
        ];
        assert_eq!(conversation_mood(&messages), ConversationMood::Positive);

        messages.push(message(Sender::User, "c", Some(Emotion::Sad)));
        messages.push(message(Sender::User, "d", Some(Emotion::Lonely)));
        assert_eq!(conversation_mood(&messages), ConversationMood::Mixed);

        messages.push(message(Sender::User, "e", Some(Emotion::Stressed)));
        messages.push(message(Sender::User, "f", None));
        // first happy fell out of the five-message window
        assert_eq!(conversation_mood(&messages), ConversationMood::Negative);
    }

    #[test]
    fn test_topics_and_common_topics() {
        let messages = vec![
            message(Sender::User, "งานเยอะมาก", None),
            message(Sender::Persona, "money and work", None),
            message(Sender::User, "my friend", None),
        ];
        assert_eq!(
            extract_topics(&messages),
            vec![Topic::Work, Topic::Money, Topic::Friends]
        );
        assert_eq!(common_topics(&messages)[0], Topic::Work);
    }

    #[test]
    fn test_infer_preferences() {
        let previous = UserPreferences {
            avoid_topics: vec![Topic::Money],
            ..UserPreferences::default()
        };
        let messages = vec![
            message(Sender::User, "hello there, please help", None),
            message(Sender::Persona, "สวัสดีครับ", None),
            message(Sender::User, "thank you so much", None),
        ];
        let preferences = infer_preferences(&messages, &previous);
        assert_eq!(preferences.language, Language::English);
        assert_eq!(preferences.response_length, ResponseLength::Short);
        assert_eq!(preferences.formality, Formality::Polite);
        assert_eq!(preferences.avoid_topics, vec![Topic::Money]);
    }

    #[test]
    fn test_notes_mention_relationship_and_preferences() {
        let state = ConversationState::new("u1", "velorien");
        let notes = personalization_notes(&state);
        assert!(notes.starts_with("Note: This is a new user."));
        assert!(notes.ends_with("User preferences: thai language, medium responses, polite tone"));
    }
}
