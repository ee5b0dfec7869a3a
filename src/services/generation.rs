// ABOUTME: Generation orchestrator producing one persona reply per user turn
// ABOUTME: Template gate, retried generation with fallbacks, validation with one improve pass, memory update
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Generation Orchestrator
//!
//! One turn runs `classify -> (template | generate) -> validate -> (accept |
//! improve) -> memory update`. Generation failures never escape: exhausted
//! retries degrade to the fixed fallback text of the last error kind. Only a
//! failing conversation store aborts the turn.

use std::sync::Arc;

use chrono::{Local, Timelike};
use serde::Serialize;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};

use crate::config::GenerationSettings;
use crate::constants::limits::{MAX_GENERATED_CHARS, PROMPT_HISTORY_TURNS};
use crate::errors::{AppResult, GenerationError, GenerationErrorKind};
use crate::intelligence::{LightClassifier, ResponseValidator, ValidationResult};
use crate::llm::prompts::{improve_prompt, persona_prompt, PromptContext};
use crate::llm::{GenerativeBackend, SafetySettings};
use crate::memory::{personalization_notes, ConversationMemory};
use crate::models::{ContextualConditions, Emotion, MessageContext, Persona, Sender, TimeOfDay};
use crate::personas::{PersonaBundle, PersonaRegistry};
use crate::random::RandomSource;

/// Phrasings that break character; generated text containing any is retried
const OUT_OF_CHARACTER_PATTERNS: &[&str] = &[
    "i cannot",
    "i am not able",
    "i do not have",
    "i cannot provide",
    "i am an ai",
    "as an ai",
    "i am a language model",
    "i am not a real person",
];

/// Appended to truncated text
const TRUNCATION_MARKER: &str = "...";

/// Where the reply text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "error")]
pub enum ResponseSource {
    /// Canned template reply
    Template,
    /// Backend output, possibly improved
    Generated,
    /// Fixed fallback after generation gave up
    Fallback(GenerationErrorKind),
}

/// Result of one turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Text to deliver
    pub text: String,
    /// Origin of `text`
    pub source: ResponseSource,
    /// Light-classifier emotion of the user message
    pub emotion: Emotion,
    /// Light-classifier context of the user message
    pub context: MessageContext,
    /// Validation of the generated text, when it was validated
    pub validation: Option<ValidationResult>,
    /// Whether the improve pass replaced the generated text
    pub improved: bool,
}

/// Produces persona replies
#[derive(Clone)]
pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerativeBackend>,
    memory: ConversationMemory,
    registry: Arc<PersonaRegistry>,
    random: Arc<dyn RandomSource>,
    settings: GenerationSettings,
    safety: SafetySettings,
}

impl GenerationOrchestrator {
    /// Orchestrator over its collaborators
    #[must_use]
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        memory: ConversationMemory,
        registry: Arc<PersonaRegistry>,
        random: Arc<dyn RandomSource>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            backend,
            memory,
            registry,
            random,
            settings,
            safety: SafetySettings::default(),
        }
    }

    /// Override the per-call safety thresholds
    #[must_use]
    pub fn with_safety(mut self, safety: SafetySettings) -> Self {
        self.safety = safety;
        self
    }

    /// Conversation memory used by this orchestrator
    #[must_use]
    pub const fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Reply of `persona` to `user_message` at the current local hour
    ///
    /// # Errors
    ///
    /// Returns the conversation store's error; backend failures are turned
    /// into fallback text instead
    pub async fn respond(
        &self,
        persona: &Persona,
        user_id: &str,
        user_message: &str,
    ) -> AppResult<TurnOutcome> {
        self.respond_at_hour(persona, user_id, user_message, Local::now().hour())
            .await
    }

    /// Reply of `persona` to `user_message` at an explicit local hour (0-23)
    ///
    /// # Errors
    ///
    /// Returns the conversation store's error
    #[instrument(skip(self, persona, user_message), fields(persona_id = %persona.id))]
    pub async fn respond_at_hour(
        &self,
        persona: &Persona,
        user_id: &str,
        user_message: &str,
        hour: u32,
    ) -> AppResult<TurnOutcome> {
        let state = self.memory.get_state(user_id, &persona.id).await?;
        let conditions = self
            .memory
            .contextual_conditions_at(user_id, &persona.id, user_message, hour)
            .await?;

        let emotion = LightClassifier::detect_emotion(user_message);
        let context = refine_context(
            LightClassifier::detect_context(user_message, state.messages.len()),
            conditions.time_of_day,
        );
        let bundle = self.registry.get(&persona.id);

        let template = match bundle {
            Some(bundle) => {
                self.try_template(bundle, user_id, &persona.id, emotion, context, &conditions)
                    .await?
            }
            None => None,
        };

        let mut outcome = if let Some(text) = template {
            info!(
                persona_id = %persona.id,
                emotion = %emotion,
                context = %context,
                template_used = true,
                "Using template response"
            );
            TurnOutcome {
                text: self.truncate(&text),
                source: ResponseSource::Template,
                emotion,
                context,
                validation: None,
                improved: false,
            }
        } else {
            let notes = personalization_notes(&state);
            let prompt = persona_prompt(&PromptContext {
                persona,
                style: bundle.map(|b| &b.style),
                history: &state.messages,
                user_message,
                notes: Some(&notes),
                max_chars: self.settings.max_response_chars,
            });
            match self.generate_with_retry(&prompt).await {
                Ok(text) => TurnOutcome {
                    text: self.truncate(&text),
                    source: ResponseSource::Generated,
                    emotion,
                    context,
                    validation: None,
                    improved: false,
                },
                Err(e) => TurnOutcome {
                    text: e.fallback_message().to_owned(),
                    source: ResponseSource::Fallback(e.kind),
                    emotion,
                    context,
                    validation: None,
                    improved: false,
                },
            }
        };

        if let (ResponseSource::Generated, Some(bundle)) = (outcome.source, bundle) {
            let history: Vec<String> = state.messages
                [state.messages.len().saturating_sub(PROMPT_HISTORY_TURNS)..]
                .iter()
                .map(|m| m.text.clone())
                .collect();
            self.validate_and_improve(persona, bundle, user_message, &history, &mut outcome)
                .await;
        }

        self.memory
            .add_message(
                user_id,
                &persona.id,
                Sender::User,
                user_message,
                Some(emotion),
                Some(context),
            )
            .await?;
        self.memory
            .add_message(user_id, &persona.id, Sender::Persona, &outcome.text, None, None)
            .await?;

        info!(
            persona_id = %persona.id,
            source = ?outcome.source,
            response_len = outcome.text.chars().count(),
            "Persona response generated"
        );
        Ok(outcome)
    }

    /// Template reply when both gates pass and a template matches
    async fn try_template(
        &self,
        bundle: &PersonaBundle,
        user_id: &str,
        persona_id: &str,
        emotion: Emotion,
        context: MessageContext,
        conditions: &ContextualConditions,
    ) -> AppResult<Option<String>> {
        if self.random.next_f64() >= self.settings.template_gate_probability {
            return Ok(None);
        }
        if !self
            .memory
            .should_use_template(user_id, persona_id, emotion, context)
            .await?
        {
            return Ok(None);
        }

        let mut selected = bundle
            .templates
            .select(emotion, context, Some(conditions), self.random.as_ref());
        if selected.is_none() && context == MessageContext::UserExpressesStressAtNight {
            selected = bundle.templates.select(
                emotion,
                MessageContext::UserExpressesStress,
                Some(conditions),
                self.random.as_ref(),
            );
        }
        if selected.is_none() {
            debug!(persona_id = %persona_id, emotion = %emotion, context = %context, "No template matched");
        }
        Ok(selected.map(str::to_owned))
    }

    /// Call the backend up to `max_attempts` times with linear backoff
    async fn generate_with_retry(&self, prompt: &str) -> Result<String, GenerationError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_error = GenerationError::unknown("no generation attempt was made");

        for attempt in 1..=max_attempts {
            info!(
                backend = self.backend.name(),
                attempt,
                max_attempts,
                "Generation attempt {attempt}/{max_attempts}"
            );

            let result = self.call_backend(prompt).await.and_then(accept_generated);
            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.kind == GenerationErrorKind::Auth => {
                    error!(backend = self.backend.name(), error = %e, "Generative backend rejected credentials");
                    return Err(e);
                }
                Err(e) if !e.is_retryable() => {
                    warn!(backend = self.backend.name(), attempt, error = %e, "Generation blocked, not retrying");
                    return Err(e);
                }
                Err(e) => {
                    warn!(backend = self.backend.name(), attempt, error = %e, "Generation attempt failed");
                    last_error = e;
                    if attempt < max_attempts {
                        sleep(self.settings.retry_delay * attempt).await;
                    }
                }
            }
        }

        error!(
            backend = self.backend.name(),
            attempts = max_attempts,
            error = %last_error,
            "All generation attempts failed"
        );
        Err(last_error)
    }

    /// One backend call bounded by the per-attempt timeout
    async fn call_backend(&self, prompt: &str) -> Result<String, GenerationError> {
        timeout(
            self.settings.attempt_timeout,
            self.backend.generate(prompt, &self.safety),
        )
        .await
        .unwrap_or_else(|_| {
            Err(GenerationError::network(format!(
                "Backend call exceeded {:?}",
                self.settings.attempt_timeout
            )))
        })
    }

    async fn validate_and_improve(
        &self,
        persona: &Persona,
        bundle: &PersonaBundle,
        user_message: &str,
        history: &[String],
        outcome: &mut TurnOutcome,
    ) {
        let validation =
            ResponseValidator::validate(&outcome.text, &bundle.style, user_message, history);

        if !validation.is_valid {
            warn!(
                persona_id = %persona.id,
                issues = ?validation.issues,
                score = validation.score,
                "Response validation failed"
            );
            let prompt = improve_prompt(persona, user_message, &outcome.text, &validation.suggestions);
            match self.call_backend(&prompt).await {
                Ok(improved) if !improved.trim().is_empty() => {
                    let improved = self.truncate(&improved);
                    info!(
                        persona_id = %persona.id,
                        original_len = outcome.text.chars().count(),
                        improved_len = improved.chars().count(),
                        "Response improved"
                    );
                    outcome.text = improved;
                    outcome.improved = true;
                }
                Ok(_) => warn!(persona_id = %persona.id, "Improve pass returned empty text, keeping original"),
                Err(e) => warn!(persona_id = %persona.id, error = %e, "Improve pass failed, keeping original"),
            }
        }

        let metrics = ResponseValidator::quality_metrics(&outcome.text, &bundle.style, user_message);
        info!(persona_id = %persona.id, ?metrics, "Response quality metrics");
        outcome.validation = Some(validation);
    }

    fn truncate(&self, text: &str) -> String {
        truncate_chars(text, self.settings.max_response_chars)
    }
}

/// Stress at night gets its own context so night-only templates apply
fn refine_context(context: MessageContext, time_of_day: TimeOfDay) -> MessageContext {
    if context == MessageContext::UserExpressesStress && time_of_day == TimeOfDay::Night {
        MessageContext::UserExpressesStressAtNight
    } else {
        context
    }
}

/// Reject empty, oversized and out-of-character output
fn accept_generated(text: String) -> Result<String, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::unknown("Empty response from backend"));
    }
    let length = text.chars().count();
    if length > MAX_GENERATED_CHARS {
        return Err(GenerationError::unknown(format!(
            "Response too long ({length} characters)"
        )));
    }
    let lower = text.to_lowercase();
    if let Some(pattern) = OUT_OF_CHARACTER_PATTERNS
        .iter()
        .find(|pattern| lower.contains(*pattern))
    {
        return Err(GenerationError::unknown(format!(
            "Response contains out-of-character phrase '{pattern}'"
        )));
    }
    Ok(text)
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let keep = max.saturating_sub(TRUNCATION_MARKER.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
