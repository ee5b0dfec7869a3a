// ABOUTME: Human escalation coordinator moving users between persona and operator modes
// ABOUTME: Escalation requests with priority, pending queue, operator replies, assignment and session info
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Escalation Coordinator
//!
//! Mode transitions per user:
//!
//! ```text
//! character --request--> human_admin (waiting) --admin reply--> human_admin
//!     ^                                                             |
//!     +----------------------------- end ---------------------------+
//! ```
//!
//! Every transition is one atomic update of the user's [`UserSessionMode`].
//! Pending requests are ordered by `last_activity`, oldest first; `priority`
//! is reported but does not affect the order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::constants::limits::{SESSION_HISTORY_CAP, SESSION_INFO_HISTORY};
use crate::constants::messages::ESCALATION_ACK_PREFIX;
use crate::errors::{AppError, AppResult};
use crate::models::{
    AdminNotification, HistorySender, Priority, SessionHistoryEntry, SessionMode, UserSessionMode,
};
use crate::notifications::NotificationSink;
use crate::session::SessionStore;

const URGENT_KEYWORDS: &[&str] = &[
    "ฉุกเฉิน",
    "emergency",
    "urgent",
    "ด่วน",
    "critical",
    "ป่วย",
    "sick",
    "เจ็บ",
    "pain",
    "เลือด",
    "blood",
    "หายใจ",
    "breathing",
    "หมดสติ",
    "unconscious",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    "ปัญหา",
    "problem",
    "ไม่เข้าใจ",
    "confused",
    "ต้องการความช่วยเหลือ",
    "need help",
    "ช่วย",
    "help",
];

/// Placeholder when a waiting session has no escalation message
const NO_MESSAGE: &str = "No message";

/// Urgency of `message`; urgent keywords win over medium ones
#[must_use]
pub fn determine_priority(message: &str) -> Priority {
    let lower = message.to_lowercase();
    if URGENT_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        Priority::High
    } else if MEDIUM_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Operator view of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    /// User ID
    pub user_id: String,
    /// Current mode
    pub mode: SessionMode,
    /// Persona the user chats with
    pub current_persona_id: Option<String>,
    /// Waiting for an operator reply
    pub is_waiting_for_human: bool,
    /// Assigned operator
    pub assigned_admin_id: Option<String>,
    /// Last state change
    pub last_activity: DateTime<Utc>,
    /// Session creation time
    pub session_start: DateTime<Utc>,
    /// Last ten history entries, oldest first
    pub recent_messages: Vec<SessionHistoryEntry>,
}

impl From<UserSessionMode> for SessionInfo {
    fn from(session: UserSessionMode) -> Self {
        let skip = session.history.len().saturating_sub(SESSION_INFO_HISTORY);
        Self {
            recent_messages: session.history.into_iter().skip(skip).collect(),
            user_id: session.user_id,
            mode: session.mode,
            current_persona_id: session.current_persona_id,
            is_waiting_for_human: session.is_waiting_for_human,
            assigned_admin_id: session.assigned_admin_id,
            last_activity: session.last_activity,
            session_start: session.session_start,
        }
    }
}

/// Coordinates escalation state and operator notifications
#[derive(Clone)]
pub struct EscalationCoordinator {
    sessions: SessionStore,
    sink: Arc<dyn NotificationSink>,
}

impl EscalationCoordinator {
    /// Coordinator over the session store and notification sink
    #[must_use]
    pub fn new(sessions: SessionStore, sink: Arc<dyn NotificationSink>) -> Self {
        Self { sessions, sink }
    }

    /// Put the user in operator mode and notify operators
    ///
    /// Returns the acknowledgement shown to the user.
    ///
    /// # Errors
    ///
    /// Returns the session store's or the sink's error
    #[instrument(skip(self, message))]
    pub async fn request_escalation(&self, user_id: &str, message: &str) -> AppResult<String> {
        let now = Utc::now();
        let priority = determine_priority(message);
        self.sink
            .enqueue(AdminNotification {
                user_id: user_id.to_owned(),
                user_message: message.to_owned(),
                timestamp: now,
                priority,
            })
            .await?;

        // Operators are notified before the user is parked in operator mode
        let parked = self
            .sessions
            .update(user_id, |session| {
                session.mode = SessionMode::HumanAdmin;
                session.is_waiting_for_human = true;
                session.last_activity = now;
                session.push_history(
                    SessionHistoryEntry {
                        timestamp: now,
                        sender: HistorySender::User,
                        message: message.to_owned(),
                        mode: SessionMode::HumanAdmin,
                    },
                    SESSION_HISTORY_CAP,
                );
            })
            .await;
        if let Err(e) = parked {
            if let Err(resolve_error) = self.sink.resolve(user_id).await {
                warn!(user_id = %user_id, error = %resolve_error, "Failed to withdraw notification");
            }
            return Err(e);
        }

        info!(user_id = %user_id, ?priority, "Human admin request received");
        Ok(format!("{ESCALATION_ACK_PREFIX}{message}"))
    }

    /// Record a follow-up user message while in operator mode
    ///
    /// # Errors
    ///
    /// Returns the session store's error
    pub async fn record_user_message(&self, user_id: &str, message: &str) -> AppResult<UserSessionMode> {
        let now = Utc::now();
        let (session, ()) = self
            .sessions
            .update(user_id, |session| {
                session.push_history(
                    SessionHistoryEntry {
                        timestamp: now,
                        sender: HistorySender::User,
                        message: message.to_owned(),
                        mode: session.mode,
                    },
                    SESSION_HISTORY_CAP,
                );
            })
            .await?;
        Ok(session)
    }

    /// Sessions waiting for an operator, oldest `last_activity` first
    ///
    /// # Errors
    ///
    /// Returns the session store's error
    pub async fn list_pending(&self) -> AppResult<Vec<AdminNotification>> {
        let mut waiting: Vec<UserSessionMode> = self
            .sessions
            .in_mode(SessionMode::HumanAdmin)
            .await?
            .into_iter()
            .filter(|session| session.is_waiting_for_human)
            .collect();
        waiting.sort_by(|a, b| {
            a.last_activity
                .cmp(&b.last_activity)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        Ok(waiting
            .iter()
            .map(|session| {
                let last = session.last_escalation_message();
                let user_message = last.map_or(NO_MESSAGE, |entry| entry.message.as_str());
                AdminNotification {
                    user_id: session.user_id.clone(),
                    user_message: user_message.to_owned(),
                    timestamp: last.map_or(session.last_activity, |entry| entry.timestamp),
                    priority: determine_priority(last.map_or("", |entry| entry.message.as_str())),
                }
            })
            .collect())
    }

    /// Record an operator reply; the session stays in operator mode
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the user has no session, or the
    /// store's error
    #[instrument(skip(self, text))]
    pub async fn admin_respond(
        &self,
        user_id: &str,
        admin_id: &str,
        text: &str,
    ) -> AppResult<UserSessionMode> {
        self.require_session(user_id).await?;
        let now = Utc::now();
        let (session, ()) = self
            .sessions
            .update(user_id, |session| {
                session.is_waiting_for_human = false;
                session.assigned_admin_id = Some(admin_id.to_owned());
                session.last_activity = now;
                session.push_history(
                    SessionHistoryEntry {
                        timestamp: now,
                        sender: HistorySender::HumanAdmin,
                        message: text.to_owned(),
                        mode: SessionMode::HumanAdmin,
                    },
                    SESSION_HISTORY_CAP,
                );
            })
            .await?;
        self.sink.resolve(user_id).await?;

        info!(user_id = %user_id, admin_id = %admin_id, "Admin response sent to user");
        Ok(session)
    }

    /// Return the user to persona mode, optionally switching persona
    ///
    /// Ending an already ended session leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns the session store's or the sink's error
    #[instrument(skip(self))]
    pub async fn end_escalation(
        &self,
        user_id: &str,
        persona_id: Option<&str>,
    ) -> AppResult<UserSessionMode> {
        let now = Utc::now();
        let (session, changed) = self
            .sessions
            .update(user_id, |session| {
                let already_ended = session.mode == SessionMode::Character
                    && !session.is_waiting_for_human
                    && session.assigned_admin_id.is_none()
                    && persona_id.is_none_or(|id| session.current_persona_id.as_deref() == Some(id));
                if already_ended {
                    return false;
                }
                session.mode = SessionMode::Character;
                session.is_waiting_for_human = false;
                session.assigned_admin_id = None;
                session.last_activity = now;
                if let Some(id) = persona_id {
                    session.current_persona_id = Some(id.to_owned());
                }
                true
            })
            .await?;

        if changed {
            self.sink.resolve(user_id).await?;
            info!(user_id = %user_id, persona_id = ?persona_id, "Human admin session ended");
        }
        Ok(session)
    }

    /// Operator view of a session, `None` when the user has none
    ///
    /// # Errors
    ///
    /// Returns the session store's error
    pub async fn session_info(&self, user_id: &str) -> AppResult<Option<SessionInfo>> {
        Ok(self.sessions.get(user_id).await?.map(SessionInfo::from))
    }

    /// Assign an operator without changing the waiting flag
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the user has no session, or the
    /// store's error
    pub async fn assign_admin(&self, user_id: &str, admin_id: &str) -> AppResult<UserSessionMode> {
        self.require_session(user_id).await?;
        let now = Utc::now();
        let (session, ()) = self
            .sessions
            .update(user_id, |session| {
                session.assigned_admin_id = Some(admin_id.to_owned());
                session.last_activity = now;
            })
            .await?;
        info!(user_id = %user_id, admin_id = %admin_id, "Admin assigned to user");
        Ok(session)
    }

    async fn require_session(&self, user_id: &str) -> AppResult<()> {
        if self.sessions.get(user_id).await?.is_none() {
            return Err(
                AppError::not_found(format!("Session for user {user_id}")).with_user_id(user_id)
            );
        }
        Ok(())
    }
}
