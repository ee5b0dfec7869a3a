// ABOUTME: Conversation memory records for one (user, persona) pair
// ABOUTME: Message log entries, emotion/context/topic labels and the derived relationship state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emotion label attached to user turns and used to key templates.
///
/// The full classifier emits the first seven plus `Neutral`; the light
/// classifier emits `Lonely`, `Stressed`, `Grateful` and a subset of the rest.
/// `Analytical` and `Encouraging` only appear as template keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    /// Joy, delight
    Happy,
    /// Sadness, tiredness
    Sad,
    /// Anger, annoyance
    Angry,
    /// Worry, fear
    Anxious,
    /// Anticipation
    Excited,
    /// Relaxed, okay
    Calm,
    /// Uncertain, lost
    Confused,
    /// Feeling alone
    Lonely,
    /// Under pressure
    Stressed,
    /// Thankful
    Grateful,
    /// Template key for reasoning-style replies
    Analytical,
    /// Template key for motivational replies
    Encouraging,
    /// No emotional signal
    Neutral,
}

impl Emotion {
    /// Stable lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Anxious => "anxious",
            Self::Excited => "excited",
            Self::Calm => "calm",
            Self::Confused => "confused",
            Self::Lonely => "lonely",
            Self::Stressed => "stressed",
            Self::Grateful => "grateful",
            Self::Analytical => "analytical",
            Self::Encouraging => "encouraging",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversational situation detected from a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContext {
    /// User says they feel lonely
    UserExpressesLoneliness,
    /// User says they feel stressed
    UserExpressesStress,
    /// Stress expressed late at night
    UserExpressesStressAtNight,
    /// User thanks the persona
    UserExpressesGratitude,
    /// Greeting or first message
    UserGreets,
    /// Request for help
    UserAsksForHelp,
    /// Request for an opinion or advice
    UserAsksForAdvice,
    /// User needs motivation
    UserNeedsEncouragement,
}

impl MessageContext {
    /// Stable snake_case label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserExpressesLoneliness => "user_expresses_loneliness",
            Self::UserExpressesStress => "user_expresses_stress",
            Self::UserExpressesStressAtNight => "user_expresses_stress_at_night",
            Self::UserExpressesGratitude => "user_expresses_gratitude",
            Self::UserGreets => "user_greets",
            Self::UserAsksForHelp => "user_asks_for_help",
            Self::UserAsksForAdvice => "user_asks_for_advice",
            Self::UserNeedsEncouragement => "user_needs_encouragement",
        }
    }
}

impl fmt::Display for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation topic detected by keyword scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Job, office
    Work,
    /// School, exams
    Study,
    /// Parents, relatives
    Family,
    /// Friendship
    Friends,
    /// Illness, wellbeing
    Health,
    /// Romance
    Love,
    /// Finances
    Money,
    /// Plans and goals
    Future,
}

impl Topic {
    /// Stable lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Study => "study",
            Self::Family => "family",
            Self::Friends => "friends",
            Self::Health => "health",
            Self::Love => "love",
            Self::Money => "money",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who sent a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The end user
    User,
    /// The AI persona
    Persona,
}

/// One immutable entry of a conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message ID
    pub id: String,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
    /// Author of the message
    pub sender: Sender,
    /// Message text
    pub text: String,
    /// Emotion detected on user turns
    pub emotion: Option<Emotion>,
    /// Context detected on user turns
    pub context: Option<MessageContext>,
}

/// Coarse familiarity bucket derived from cumulative interaction count.
///
/// Ordered so that transitions can be checked for monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipLevel {
    /// Fewer than 20 interactions
    New,
    /// 20 to 49 interactions
    Familiar,
    /// 50 or more interactions
    Close,
}

impl RelationshipLevel {
    /// Interaction count at which a user becomes familiar
    pub const FAMILIAR_THRESHOLD: u64 = 20;
    /// Interaction count at which a user becomes close
    pub const CLOSE_THRESHOLD: u64 = 50;

    /// Bucket for an interaction count
    #[must_use]
    pub const fn from_interaction_count(count: u64) -> Self {
        if count >= Self::CLOSE_THRESHOLD {
            Self::Close
        } else if count >= Self::FAMILIAR_THRESHOLD {
            Self::Familiar
        } else {
            Self::New
        }
    }

    /// Stable lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Familiar => "familiar",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for RelationshipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall tone of the recent conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMood {
    /// No dominant polarity
    Neutral,
    /// Mostly positive emotions
    Positive,
    /// Mostly negative emotions
    Negative,
    /// Equal, non-zero positive and negative signals
    Mixed,
}

impl fmt::Display for ConversationMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Mixed => "mixed",
        })
    }
}

/// Language mode of a user or persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Predominantly Thai script
    Thai,
    /// Predominantly Latin script
    English,
    /// Both scripts in comparable amounts
    Mixed,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Thai => "thai",
            Self::English => "english",
            Self::Mixed => "mixed",
        })
    }
}

/// Target response length class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    /// Up to about 20 words
    Short,
    /// About 15 to 50 words
    Medium,
    /// 30 words or more
    Long,
}

impl fmt::Display for ResponseLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        })
    }
}

/// Register of speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    /// Informal
    Casual,
    /// Polite particles, friendly
    Polite,
    /// Honorifics, formal address
    Formal,
}

impl fmt::Display for Formality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Casual => "casual",
            Self::Polite => "polite",
            Self::Formal => "formal",
        })
    }
}

/// Preferences inferred from (or explicitly set for) a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Preferred language
    pub language: Language,
    /// Preferred response length
    pub response_length: ResponseLength,
    /// Preferred register
    pub formality: Formality,
    /// Topics the user talks about
    pub topics: Vec<Topic>,
    /// Topics the persona should steer away from
    pub avoid_topics: Vec<Topic>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            language: Language::Thai,
            response_length: ResponseLength::Medium,
            formality: Formality::Polite,
            topics: Vec::new(),
            avoid_topics: Vec::new(),
        }
    }
}

/// Conversational memory for one (user, persona) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Messaging platform user ID
    pub user_id: String,
    /// Persona identifier
    pub persona_id: String,
    /// Bounded, time-ordered message window
    pub messages: Vec<ConversationMessage>,
    /// Familiarity bucket, never regresses
    pub relationship_level: RelationshipLevel,
    /// Tone of the last few messages
    pub conversation_mood: ConversationMood,
    /// Topics mentioned in the last ten messages
    pub topics: Vec<Topic>,
    /// Inferred user preferences
    pub user_preferences: UserPreferences,
    /// Time of the latest message, `None` until the first one
    pub last_interaction: Option<DateTime<Utc>>,
    /// Number of messages added since creation
    pub interaction_count: u64,
}

impl ConversationState {
    /// Fresh state for an unseen pair
    pub fn new(user_id: impl Into<String>, persona_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            persona_id: persona_id.into(),
            messages: Vec::new(),
            relationship_level: RelationshipLevel::New,
            conversation_mood: ConversationMood::Neutral,
            topics: Vec::new(),
            user_preferences: UserPreferences::default(),
            last_interaction: None,
            interaction_count: 0,
        }
    }
}

/// Local time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 05:00 to 11:59
    Morning,
    /// 12:00 to 16:59
    Afternoon,
    /// 17:00 to 21:59
    Evening,
    /// 22:00 to 04:59
    Night,
}

impl TimeOfDay {
    /// Bucket for a local hour (0-23)
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=21 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Coarse size of the stored conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationLength {
    /// Fewer than 5 stored messages
    Short,
    /// 5 to 19 stored messages
    Medium,
    /// 20 or more stored messages
    Long,
}

impl ConversationLength {
    /// Bucket for a stored message count
    #[must_use]
    pub const fn from_message_count(count: usize) -> Self {
        if count < 5 {
            Self::Short
        } else if count < 20 {
            Self::Medium
        } else {
            Self::Long
        }
    }
}

/// Read-only projection used to filter templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualConditions {
    /// Current local time bucket
    pub time_of_day: TimeOfDay,
    /// Mood detected on the current message
    pub user_mood: Vec<Emotion>,
    /// Size of the stored conversation
    pub conversation_length: ConversationLength,
    /// Current relationship level
    pub relationship_level: RelationshipLevel,
    /// Current conversation mood
    pub conversation_mood: ConversationMood,
    /// Up to three most recent topics
    pub recent_topics: Vec<Topic>,
}
