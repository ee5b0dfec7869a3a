// ABOUTME: Per-user session mode shared by the chat pipeline and the escalation coordinator
// ABOUTME: Mode state machine record, session history entries and operator notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which subsystem answers the user's messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// AI persona conversation
    #[default]
    Character,
    /// Human operator conversation
    HumanAdmin,
    /// Static informational content
    MedicalInfo,
}

/// Author of a session history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySender {
    /// The end user
    User,
    /// Automated reply
    Bot,
    /// Human operator
    HumanAdmin,
}

/// Entry of the per-user session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistoryEntry {
    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,
    /// Who wrote it
    pub sender: HistorySender,
    /// Message text
    pub message: String,
    /// Session mode at the time
    pub mode: SessionMode,
}

/// Mode record for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSessionMode {
    /// Messaging platform user ID
    pub user_id: String,
    /// Current mode
    pub mode: SessionMode,
    /// Persona the user is chatting with
    pub current_persona_id: Option<String>,
    /// Escalated and no operator reply yet; only meaningful in `HumanAdmin`
    pub is_waiting_for_human: bool,
    /// Operator handling the escalation
    pub assigned_admin_id: Option<String>,
    /// Last state change
    pub last_activity: DateTime<Utc>,
    /// When the session was created
    pub session_start: DateTime<Utc>,
    /// Bounded history of escalation and info-mode traffic
    pub history: Vec<SessionHistoryEntry>,
}

impl UserSessionMode {
    /// New session in character mode
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            mode: SessionMode::Character,
            current_persona_id: None,
            is_waiting_for_human: false,
            assigned_admin_id: None,
            last_activity: now,
            session_start: now,
            history: Vec::new(),
        }
    }

    /// Append a history entry, dropping the oldest beyond `cap`
    pub fn push_history(&mut self, entry: SessionHistoryEntry, cap: usize) {
        self.history.push(entry);
        if self.history.len() > cap {
            let excess = self.history.len() - cap;
            self.history.drain(..excess);
        }
    }

    /// Most recent user message sent while in `HumanAdmin` mode
    #[must_use]
    pub fn last_escalation_message(&self) -> Option<&SessionHistoryEntry> {
        self.history
            .iter()
            .rev()
            .find(|e| e.sender == HistorySender::User && e.mode == SessionMode::HumanAdmin)
    }
}

/// Urgency of an escalation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// No urgency keywords
    Low,
    /// Help or problem keywords
    Medium,
    /// Emergency or health keywords
    High,
}

/// Record delivered to the operator-facing queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminNotification {
    /// User awaiting an operator
    pub user_id: String,
    /// Latest escalation message
    pub user_message: String,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// Informational urgency
    pub priority: Priority,
}
