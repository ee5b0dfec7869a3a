// ABOUTME: Conversation memory store for (user, persona) pairs
// ABOUTME: Bounded message log with derived relationship, mood, topics and preferences behind a CAS store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Conversation Memory
//!
//! One [`ConversationState`] per (user, persona) pair. Every mutation goes
//! through [`store::update`], so concurrent turns for the same pair never
//! lose messages. Derived fields are recomputed from the message window on
//! every append.

/// Pure derivations over the message window
pub mod analysis;

pub use analysis::personalization_notes;

use std::sync::Arc;

use chrono::{Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::limits::{MAX_CONVERSATION_MESSAGES, SIMILARITY_THRESHOLD, TOPIC_WINDOW};
use crate::errors::AppResult;
use crate::intelligence::{text::jaccard, LightClassifier};
use crate::models::{
    ContextualConditions, ConversationLength, ConversationMessage, ConversationMood,
    ConversationState, Emotion, Formality, Language, MessageContext, RelationshipLevel,
    ResponseLength, Sender, TimeOfDay, Topic, UserPreferences,
};
use crate::random::RandomSource;
use crate::store::{self, KeyValueStore};

/// Familiar users take the template path when the draw exceeds this (about 70%)
const FAMILIAR_TEMPLATE_THRESHOLD: f64 = 0.3;
/// Close users take the template path when the draw exceeds this (about 30%)
const CLOSE_TEMPLATE_THRESHOLD: f64 = 0.7;

/// Partial preference update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPatch {
    /// New language
    pub language: Option<Language>,
    /// New response length
    pub response_length: Option<ResponseLength>,
    /// New register
    pub formality: Option<Formality>,
    /// New topic list
    pub topics: Option<Vec<Topic>>,
    /// New avoid list
    pub avoid_topics: Option<Vec<Topic>>,
}

/// Snapshot returned by [`ConversationMemory::summary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Messages currently stored
    pub total_messages: usize,
    /// User messages among the last ten
    pub recent_user_messages: usize,
    /// Persona messages among the last ten
    pub recent_persona_messages: usize,
    /// Relationship level
    pub relationship_level: RelationshipLevel,
    /// Conversation mood
    pub conversation_mood: ConversationMood,
    /// Most mentioned topics
    pub common_topics: Vec<Topic>,
    /// Current preferences
    pub user_preferences: UserPreferences,
}

/// Conversation memory over a versioned key-value store
#[derive(Clone)]
pub struct ConversationMemory {
    store: Arc<dyn KeyValueStore<ConversationState>>,
    random: Arc<dyn RandomSource>,
}

impl ConversationMemory {
    /// Memory over `store`, drawing template gates from `random`
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore<ConversationState>>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self { store, random }
    }

    /// Store key of a pair; the length prefix keeps IDs containing ':' apart
    fn key(user_id: &str, persona_id: &str) -> String {
        format!("{}:{user_id}:{persona_id}", user_id.len())
    }

    /// State of the pair, created with defaults on first access
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn get_state(&self, user_id: &str, persona_id: &str) -> AppResult<ConversationState> {
        let key = Self::key(user_id, persona_id);
        if let Some(existing) = self.store.get(&key).await? {
            return Ok(existing.value);
        }
        let (state, ()) = store::update(
            self.store.as_ref(),
            &key,
            || ConversationState::new(user_id, persona_id),
            |_| (),
        )
        .await?;
        Ok(state)
    }

    /// Append a message and recompute the derived fields
    ///
    /// # Errors
    ///
    /// Returns the store's error, or `ResourceConflict` under sustained contention
    pub async fn add_message(
        &self,
        user_id: &str,
        persona_id: &str,
        sender: Sender,
        text: &str,
        emotion: Option<Emotion>,
        context: Option<MessageContext>,
    ) -> AppResult<ConversationState> {
        let key = Self::key(user_id, persona_id);
        let message = ConversationMessage {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            sender,
            text: text.to_owned(),
            emotion,
            context,
        };

        let (state, ()) = store::update(
            self.store.as_ref(),
            &key,
            || ConversationState::new(user_id, persona_id),
            |state| apply_message(state, message.clone()),
        )
        .await?;

        debug!(
            user_id = %user_id,
            persona_id = %persona_id,
            message_count = state.messages.len(),
            interaction_count = state.interaction_count,
            relationship_level = %state.relationship_level,
            "Context updated"
        );
        Ok(state)
    }

    /// Template filtering conditions for the current message at the local hour
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn contextual_conditions(
        &self,
        user_id: &str,
        persona_id: &str,
        current_text: &str,
    ) -> AppResult<ContextualConditions> {
        self.contextual_conditions_at(user_id, persona_id, current_text, Local::now().hour())
            .await
    }

    /// Template filtering conditions at an explicit local hour (0-23)
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn contextual_conditions_at(
        &self,
        user_id: &str,
        persona_id: &str,
        current_text: &str,
        hour: u32,
    ) -> AppResult<ContextualConditions> {
        let state = self.get_state(user_id, persona_id).await?;
        Ok(ContextualConditions {
            time_of_day: TimeOfDay::from_hour(hour),
            user_mood: vec![LightClassifier::detect_user_mood(current_text)],
            conversation_length: ConversationLength::from_message_count(state.messages.len()),
            relationship_level: state.relationship_level,
            conversation_mood: state.conversation_mood,
            recent_topics: analysis::recent_topics(&state.topics),
        })
    }

    /// Relationship-dependent template gate
    ///
    /// Always true for new users, otherwise one independent draw: about 70%
    /// for familiar users and 30% for close ones.
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn should_use_template(
        &self,
        user_id: &str,
        persona_id: &str,
        emotion: Emotion,
        context: MessageContext,
    ) -> AppResult<bool> {
        let state = self.get_state(user_id, persona_id).await?;
        let use_template = match state.relationship_level {
            RelationshipLevel::New => true,
            RelationshipLevel::Familiar => self.random.next_f64() > FAMILIAR_TEMPLATE_THRESHOLD,
            RelationshipLevel::Close => self.random.next_f64() > CLOSE_TEMPLATE_THRESHOLD,
        };
        debug!(
            user_id = %user_id,
            persona_id = %persona_id,
            emotion = %emotion,
            context = %context,
            relationship_level = %state.relationship_level,
            use_template,
            "Template gate evaluated"
        );
        Ok(use_template)
    }

    /// Recent messages relevant to `current_text`
    ///
    /// Looks at the last `2 * max` messages, keeps persona messages and user
    /// messages whose word overlap with `current_text` exceeds 0.3, and
    /// returns the last `max` of those.
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn relevant_history(
        &self,
        user_id: &str,
        persona_id: &str,
        current_text: &str,
        max: usize,
    ) -> AppResult<Vec<ConversationMessage>> {
        let state = self.get_state(user_id, persona_id).await?;
        let window = &state.messages[state.messages.len().saturating_sub(max * 2)..];
        let relevant: Vec<ConversationMessage> = window
            .iter()
            .filter(|message| {
                message.sender == Sender::Persona
                    || jaccard(&message.text, current_text) > SIMILARITY_THRESHOLD
            })
            .cloned()
            .collect();
        let skip = relevant.len().saturating_sub(max);
        Ok(relevant.into_iter().skip(skip).collect())
    }

    /// Counts, relationship, mood, common topics and preferences of the pair
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn summary(&self, user_id: &str, persona_id: &str) -> AppResult<ConversationSummary> {
        let state = self.get_state(user_id, persona_id).await?;
        let recent = &state.messages[state.messages.len().saturating_sub(TOPIC_WINDOW)..];
        Ok(ConversationSummary {
            total_messages: state.messages.len(),
            recent_user_messages: recent.iter().filter(|m| m.sender == Sender::User).count(),
            recent_persona_messages: recent
                .iter()
                .filter(|m| m.sender == Sender::Persona)
                .count(),
            relationship_level: state.relationship_level,
            conversation_mood: state.conversation_mood,
            common_topics: analysis::common_topics(&state.messages),
            user_preferences: state.user_preferences,
        })
    }

    /// Merge an explicit preference patch
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn update_preferences(
        &self,
        user_id: &str,
        persona_id: &str,
        patch: PreferencesPatch,
    ) -> AppResult<UserPreferences> {
        let key = Self::key(user_id, persona_id);
        let (state, ()) = store::update(
            self.store.as_ref(),
            &key,
            || ConversationState::new(user_id, persona_id),
            |state| apply_patch(&mut state.user_preferences, &patch),
        )
        .await?;
        info!(user_id = %user_id, persona_id = %persona_id, ?patch, "User preferences updated");
        Ok(state.user_preferences)
    }

    /// Drop the pair's state; the next access starts fresh
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn clear(&self, user_id: &str, persona_id: &str) -> AppResult<()> {
        store::remove(self.store.as_ref(), &Self::key(user_id, persona_id)).await?;
        info!(user_id = %user_id, persona_id = %persona_id, "Context cleared");
        Ok(())
    }
}

fn apply_message(state: &mut ConversationState, message: ConversationMessage) {
    state.last_interaction = Some(message.timestamp);
    state.messages.push(message);
    if state.messages.len() > MAX_CONVERSATION_MESSAGES {
        let excess = state.messages.len() - MAX_CONVERSATION_MESSAGES;
        state.messages.drain(..excess);
    }
    state.interaction_count += 1;
    state.relationship_level = state
        .relationship_level
        .max(RelationshipLevel::from_interaction_count(state.interaction_count));
    state.conversation_mood = analysis::conversation_mood(&state.messages);
    state.topics = analysis::extract_topics(&state.messages);
    state.user_preferences = analysis::infer_preferences(&state.messages, &state.user_preferences);
}

fn apply_patch(preferences: &mut UserPreferences, patch: &PreferencesPatch) {
    if let Some(language) = patch.language {
        preferences.language = language;
    }
    if let Some(length) = patch.response_length {
        preferences.response_length = length;
    }
    if let Some(formality) = patch.formality {
        preferences.formality = formality;
    }
    if let Some(topics) = &patch.topics {
        preferences.topics.clone_from(topics);
    }
    if let Some(avoid) = &patch.avoid_topics {
        preferences.avoid_topics.clone_from(avoid);
    }
}
