// ABOUTME: Data model shared by the chat pipeline, escalation coordinator and HTTP layer
// ABOUTME: Re-exports persona, conversation memory and session mode types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Conversation memory records, labels and derived state
pub mod conversation;
/// Persona catalog records
pub mod persona;
/// Per-user session modes and operator notifications
pub mod session;

pub use conversation::{
    ContextualConditions, ConversationLength, ConversationMessage, ConversationMood,
    ConversationState, Emotion, Formality, Language, MessageContext, RelationshipLevel,
    ResponseLength, Sender, TimeOfDay, Topic, UserPreferences,
};
pub use persona::Persona;
pub use session::{
    AdminNotification, HistorySender, Priority, SessionHistoryEntry, SessionMode,
    UserSessionMode,
};
