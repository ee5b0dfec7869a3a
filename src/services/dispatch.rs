// ABOUTME: Inbound event dispatch: input sanitising, slash commands and per-mode routing
// ABOUTME: Serializes events per user and hands replies to the outbound messaging transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Chatbot Service
//!
//! Entry point for one inbound text event. Routing order:
//!
//! 1. slash commands (`/characters`, `/switch`, `/admin`, `/info`, `/back`, `/reset`, `/help`)
//! 2. natural-language escalation phrases
//! 3. the user's session mode: operator, info or persona chat
//!
//! Events of one user are handled under that user's lock; different users run
//! concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::PersonaCatalog;
use crate::constants::defaults::PERSONA_ID;
use crate::constants::limits::MAX_INPUT_CHARS;
use crate::constants::messages::{
    persona_switched, ADMIN_REQUEST_DEFAULT, DEFAULT_QUICK_REPLIES, ESCALATION_ENDED,
    ESCALATION_END_FAILED, ESCALATION_REQUEST_FAILED, HELP, INFO_MODE_ENTERED, MEMORY_RESET,
    NO_PERSONAS, PERSONA_LIST_FOOTER, PERSONA_LIST_HEADER, PERSONA_NOT_FOUND, SWITCH_USAGE,
    TURN_FAILED, UNKNOWN_COMMAND, WAITING_FOR_ADMIN,
};
use crate::errors::AppResult;
use crate::models::{Persona, SessionMode, UserSessionMode};
use crate::services::escalation::EscalationCoordinator;
use crate::services::generation::GenerationOrchestrator;
use crate::services::info::InfoResponder;
use crate::session::SessionStore;
use crate::transport::{MessagingTransport, OutboundMessage};

/// Phrases that ask for a human without using `/admin`
const ESCALATION_PHRASES: &[&str] = &[
    "คุยกับแอดมิน",
    "ติดต่อแอดมิน",
    "คุยกับคนจริง",
    "talk to admin",
    "talk to a human",
    "speak to a human",
    "real person",
];

/// Whole-message triggers
const ESCALATION_WORDS: &[&str] = &["admin", "human", "แอดมิน"];

/// One inbound text event, already extracted from the platform payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Sender
    pub user_id: String,
    /// Raw message text
    pub text: String,
    /// Token for replying to this event
    pub reply_token: String,
}

/// Parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/characters`
    Characters,
    /// `/switch <name>` or `/character <name>`
    Switch(Option<String>),
    /// `/admin [message]`
    Admin(Option<String>),
    /// `/info`
    Info,
    /// `/back`
    Back,
    /// `/reset`
    Reset,
    /// `/help`
    Help,
    /// Anything else starting with `/`
    Unknown(String),
}

impl Command {
    /// Parse `text` when it starts with `/`
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix('/')?;
        let (name, rest) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(name, rest)| (name, rest.trim()));
        let argument = (!rest.is_empty()).then(|| rest.to_owned());

        Some(match name.to_lowercase().as_str() {
            "characters" => Self::Characters,
            "switch" | "character" => Self::Switch(argument),
            "admin" => Self::Admin(argument),
            "info" => Self::Info,
            "back" => Self::Back,
            "reset" => Self::Reset,
            "help" => Self::Help,
            other => Self::Unknown(other.to_owned()),
        })
    }
}

/// Strip angle brackets, collapse whitespace and cap the length
#[must_use]
pub fn sanitize_input(text: &str) -> String {
    let stripped = text.replace(['<', '>'], "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_INPUT_CHARS).collect()
}

/// Whether `text` asks for a human operator in plain language
#[must_use]
pub fn is_escalation_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    let trimmed = lower.trim();
    ESCALATION_WORDS.contains(&trimmed)
        || ESCALATION_PHRASES
            .iter()
            .any(|phrase| lower.contains(phrase))
}

/// Routes inbound events and delivers replies
#[derive(Clone)]
pub struct ChatbotService {
    catalog: Arc<dyn PersonaCatalog>,
    sessions: SessionStore,
    escalation: EscalationCoordinator,
    orchestrator: GenerationOrchestrator,
    info: Arc<InfoResponder>,
    transport: Arc<dyn MessagingTransport>,
    user_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ChatbotService {
    /// Service over its collaborators
    #[must_use]
    pub fn new(
        catalog: Arc<dyn PersonaCatalog>,
        sessions: SessionStore,
        escalation: EscalationCoordinator,
        orchestrator: GenerationOrchestrator,
        info: Arc<InfoResponder>,
        transport: Arc<dyn MessagingTransport>,
    ) -> Self {
        Self {
            catalog,
            sessions,
            escalation,
            orchestrator,
            info,
            transport,
            user_locks: Arc::new(DashMap::new()),
        }
    }

    /// Escalation coordinator shared with the admin endpoints
    #[must_use]
    pub const fn escalation(&self) -> &EscalationCoordinator {
        &self.escalation
    }

    /// Generation orchestrator and the conversation memory behind it
    #[must_use]
    pub const fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    /// Handle one event and send its reply, if any
    ///
    /// Returns the reply that was delivered.
    ///
    /// # Errors
    ///
    /// Returns the transport's error when delivery fails
    #[instrument(skip(self, event), fields(user_id = %event.user_id))]
    pub async fn handle_event(&self, event: &InboundEvent) -> AppResult<Option<OutboundMessage>> {
        let text = sanitize_input(&event.text);
        if text.is_empty() {
            debug!("Ignoring empty message");
            return Ok(None);
        }

        let lock = self.user_lock(&event.user_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.deliver_turn(event, &text).await
        };
        drop(lock);
        self.user_locks
            .remove_if(&event.user_id, |_, entry| Arc::strong_count(entry) == 1);
        outcome
    }

    /// Users with a turn queued or in flight
    #[must_use]
    pub fn busy_users(&self) -> usize {
        self.user_locks.len()
    }

    async fn deliver_turn(
        &self,
        event: &InboundEvent,
        text: &str,
    ) -> AppResult<Option<OutboundMessage>> {
        let reply = match self.route(&event.user_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Failed to handle message");
                Some(OutboundMessage::text(TURN_FAILED))
            }
        };

        if let Some(message) = &reply {
            if let Err(e) = self.transport.reply(&event.reply_token, message).await {
                error!(error = %e, "Failed to deliver reply");
                return Err(e);
            }
        }
        Ok(reply)
    }

    /// Record an operator reply and push it to the user
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user, or the store's or the
    /// transport's error
    pub async fn deliver_admin_reply(
        &self,
        user_id: &str,
        admin_id: &str,
        text: &str,
    ) -> AppResult<()> {
        self.escalation.admin_respond(user_id, admin_id, text).await?;
        self.transport
            .push(user_id, &OutboundMessage::text(text))
            .await
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(&self.user_locks.entry(user_id.to_owned()).or_default())
    }

    async fn route(&self, user_id: &str, text: &str) -> AppResult<Option<OutboundMessage>> {
        if let Some(command) = Command::parse(text) {
            debug!(?command, "Command received");
            return self.handle_command(user_id, command).await.map(Some);
        }
        if is_escalation_request(text) {
            return Ok(Some(self.escalate(user_id, text).await));
        }

        let session = self.sessions.get_or_create(user_id).await?;
        match session.mode {
            SessionMode::HumanAdmin => {
                let session = self.escalation.record_user_message(user_id, text).await?;
                Ok(session
                    .is_waiting_for_human
                    .then(|| OutboundMessage::text(WAITING_FOR_ADMIN)))
            }
            SessionMode::MedicalInfo => Ok(Some(OutboundMessage::text(self.info.respond(text)))),
            SessionMode::Character => self.persona_turn(&session, text).await.map(Some),
        }
    }

    async fn persona_turn(
        &self,
        session: &UserSessionMode,
        text: &str,
    ) -> AppResult<OutboundMessage> {
        let Some(persona) = self.current_persona(session).await? else {
            return Ok(OutboundMessage::text(NO_PERSONAS));
        };
        let outcome = self
            .orchestrator
            .respond(&persona, &session.user_id, text)
            .await?;
        Ok(OutboundMessage::text(outcome.text).with_quick_replies(DEFAULT_QUICK_REPLIES.iter().copied()))
    }

    /// Chosen persona, or the default one when unset or no longer active
    async fn current_persona(&self, session: &UserSessionMode) -> AppResult<Option<Persona>> {
        if let Some(id) = session.current_persona_id.as_deref() {
            if let Some(persona) = self.catalog.find_active_persona(id).await? {
                return Ok(Some(persona));
            }
            warn!(persona_id = %id, "Selected persona unavailable, using default");
        }
        self.catalog.find_active_persona(PERSONA_ID).await
    }

    async fn handle_command(&self, user_id: &str, command: Command) -> AppResult<OutboundMessage> {
        match command {
            Command::Characters => self.list_personas().await,
            Command::Switch(None) => Ok(OutboundMessage::text(SWITCH_USAGE)),
            Command::Switch(Some(name)) => self.switch_persona(user_id, &name).await,
            Command::Admin(message) => Ok(self
                .escalate(user_id, message.as_deref().unwrap_or(ADMIN_REQUEST_DEFAULT))
                .await),
            Command::Info => {
                self.sessions
                    .update(user_id, |session| {
                        session.mode = SessionMode::MedicalInfo;
                        session.is_waiting_for_human = false;
                        session.assigned_admin_id = None;
                    })
                    .await?;
                info!(user_id = %user_id, "Entered info mode");
                Ok(OutboundMessage::text(INFO_MODE_ENTERED))
            }
            Command::Back => Ok(match self.escalation.end_escalation(user_id, None).await {
                Ok(_) => OutboundMessage::text(ESCALATION_ENDED),
                Err(e) => {
                    error!(error = %e, "Failed to end escalation");
                    OutboundMessage::text(ESCALATION_END_FAILED)
                }
            }),
            Command::Reset => {
                let session = self.sessions.get_or_create(user_id).await?;
                let persona_id = session.current_persona_id.as_deref().unwrap_or(PERSONA_ID);
                self.orchestrator.memory().clear(user_id, persona_id).await?;
                info!(user_id = %user_id, persona_id = %persona_id, "Conversation memory reset");
                Ok(OutboundMessage::text(MEMORY_RESET))
            }
            Command::Help => Ok(OutboundMessage::text(HELP)
                .with_quick_replies(DEFAULT_QUICK_REPLIES.iter().copied())),
            Command::Unknown(name) => {
                debug!(command = %name, "Unknown command");
                Ok(OutboundMessage::text(UNKNOWN_COMMAND))
            }
        }
    }

    async fn list_personas(&self) -> AppResult<OutboundMessage> {
        let personas = self.catalog.list_active_personas().await?;
        if personas.is_empty() {
            return Ok(OutboundMessage::text(NO_PERSONAS));
        }
        let mut lines = vec![PERSONA_LIST_HEADER.to_owned()];
        lines.extend(
            personas
                .iter()
                .map(|persona| format!("• {} - {}", persona.name, persona.description)),
        );
        lines.push(PERSONA_LIST_FOOTER.to_owned());
        Ok(OutboundMessage::text(lines.join("\n")).with_quick_replies(
            personas
                .iter()
                .map(|persona| format!("/switch {}", persona.name)),
        ))
    }

    async fn switch_persona(&self, user_id: &str, name: &str) -> AppResult<OutboundMessage> {
        let Some(persona) = self.catalog.find_active_persona(name).await? else {
            return Ok(OutboundMessage::text(PERSONA_NOT_FOUND));
        };

        let previous = self.sessions.set_persona(user_id, &persona.id).await?;
        let previous = previous.unwrap_or_else(|| PERSONA_ID.to_owned());
        if previous != persona.id {
            self.orchestrator.memory().clear(user_id, &previous).await?;
        }
        info!(user_id = %user_id, from = %previous, to = %persona.id, "Persona switched");
        Ok(OutboundMessage::text(persona_switched(&persona.name))
            .with_quick_replies(DEFAULT_QUICK_REPLIES.iter().copied()))
    }

    async fn escalate(&self, user_id: &str, message: &str) -> OutboundMessage {
        match self.escalation.request_escalation(user_id, message).await {
            Ok(ack) => OutboundMessage::text(ack),
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Escalation request failed");
                OutboundMessage::text(ESCALATION_REQUEST_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/characters"), Some(Command::Characters));
        assert_eq!(
            Command::parse("/switch  Sherlock"),
            Some(Command::Switch(Some("Sherlock".to_owned())))
        );
        assert_eq!(
            Command::parse("/character Luna"),
            Some(Command::Switch(Some("Luna".to_owned())))
        );
        assert_eq!(Command::parse("/switch"), Some(Command::Switch(None)));
        assert_eq!(Command::parse("/ADMIN"), Some(Command::Admin(None)));
        assert_eq!(
            Command::parse("/dance now"),
            Some(Command::Unknown("dance".to_owned()))
        );
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("  <b>hi</b>\n\tthere  "), "bhi/b there");
        assert_eq!(sanitize_input(&"ก".repeat(600)).chars().count(), MAX_INPUT_CHARS);
        assert_eq!(sanitize_input(" <> "), "");
    }

    #[test]
    fn test_escalation_phrases() {
        assert!(is_escalation_request("ขอคุยกับแอดมินหน่อย"));
        assert!(is_escalation_request("Can I talk to admin?"));
        assert!(is_escalation_request("human"));
        assert!(!is_escalation_request("what makes us human"));
    }
}
