// ABOUTME: Prompt builders for persona response generation and the one-shot improve pass
// ABOUTME: Combines persona identity, style guidance, recent turns and personalization notes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Prompts
//!
//! Prompts are plain text. The generation prompt is laid out as:
//!
//! 1. identity block (description, personality, background, instructions)
//! 2. behavior guidelines plus the persona's style profile when it has one
//! 3. up to [`PROMPT_HISTORY_TURNS`] previous turns
//! 4. the current user message
//! 5. personalization notes, when supplied

use std::fmt::Write;

use crate::constants::limits::PROMPT_HISTORY_TURNS;
use crate::models::{ConversationMessage, Persona, Sender};
use crate::personas::StyleProfile;

/// Inputs of [`persona_prompt`]
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// Persona answering
    pub persona: &'a Persona,
    /// Style profile, when the persona has a bundle
    pub style: Option<&'a StyleProfile>,
    /// Stored conversation, oldest first
    pub history: &'a [ConversationMessage],
    /// Current user message
    pub user_message: &'a str,
    /// Personalization notes from conversation memory
    pub notes: Option<&'a str>,
    /// Character budget stated to the model
    pub max_chars: usize,
}

/// Full generation prompt
#[must_use]
pub fn persona_prompt(ctx: &PromptContext<'_>) -> String {
    let persona = ctx.persona;
    let mut prompt = format!(
        "You are {name}.\n\nCORE IDENTITY:\n{description}\n\nPERSONALITY:\n{personality}\n\n\
BACKGROUND:\n{background}\n\nCHARACTER INSTRUCTIONS:\n{instructions}\n\n",
        name = persona.name,
        description = persona.description,
        personality = persona.personality,
        background = persona.background,
        instructions = persona.prompt,
    );

    let _ = write!(
        prompt,
        "IMPORTANT GUIDELINES:\n\
- Respond as {name} naturally, as if you're a real person\n\
- Vary your sentence structure, vocabulary, and response length\n\
- Don't be overly formal or robotic - be conversational\n\
- Show genuine emotions and reactions\n\
- Don't repeat the same phrases or patterns\n\
- Keep responses under {max} characters\n\
- Be appropriate for high school students (ages 14-18)\n\
- If you don't know something, respond as your character would naturally\n",
        name = persona.name,
        max = ctx.max_chars,
    );

    if let Some(style) = ctx.style {
        let _ = write!(
            prompt,
            "- Write in {} with a {} tone, {} responses, {} emoji\n",
            style.language,
            style.formality,
            style.response_length,
            style.emoji_usage.as_str()
        );
        if !style.traits.is_empty() {
            let _ = writeln!(prompt, "- Let these traits show: {}", style.traits.join(", "));
        }
    }

    let recent = &ctx.history[ctx.history.len().saturating_sub(PROMPT_HISTORY_TURNS)..];
    if !recent.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        for message in recent {
            let speaker = match message.sender {
                Sender::User => "User",
                Sender::Persona => persona.name.as_str(),
            };
            let _ = writeln!(prompt, "{speaker}: {}", message.text);
        }
    }

    let _ = write!(
        prompt,
        "\nUser: \"{}\"\n\n{}:",
        ctx.user_message, persona.name
    );

    if let Some(notes) = ctx.notes.filter(|notes| !notes.is_empty()) {
        let _ = write!(prompt, "\n\n{notes}");
    }
    prompt
}

/// Prompt asking the backend to rewrite `original` according to `suggestions`
#[must_use]
pub fn improve_prompt(
    persona: &Persona,
    user_message: &str,
    original: &str,
    suggestions: &[String],
) -> String {
    let mut prompt = format!(
        "You are {}. Improve this response based on the following suggestions:\n\n\
Original response: \"{original}\"\n\nSuggestions for improvement:\n",
        persona.name
    );
    for suggestion in suggestions {
        let _ = writeln!(prompt, "- {suggestion}");
    }
    let _ = write!(
        prompt,
        "\nUser message: \"{user_message}\"\n\n\
Please provide an improved response that addresses these suggestions while maintaining \
your character's personality and style."
    );
    prompt
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn persona() -> Persona {
        Persona {
            id: "velorien".to_owned(),
            name: "Velorien".to_owned(),
            description: "A gentle listener".to_owned(),
            personality: "Warm".to_owned(),
            background: "Lives among the stars".to_owned(),
            prompt: "Speak softly".to_owned(),
            aliases: Vec::new(),
            is_active: true,
        }
    }

    fn message(sender: Sender, text: &str) -> ConversationMessage {
        ConversationMessage {
            id: text.to_owned(),
            timestamp: Utc::now(),
            sender,
            text: text.to_owned(),
            emotion: None,
            context: None,
        }
    }

    #[test]
    fn test_prompt_keeps_last_six_turns() {
        let persona = persona();
        let history: Vec<ConversationMessage> = (0..8)
            .map(|i| message(Sender::User, &format!("turn-{i}")))
            .collect();
        let prompt = persona_prompt(&PromptContext {
            persona: &persona,
            style: None,
            history: &history,
            user_message: "เหงาจัง",
            notes: Some("Note: This is a new user."),
            max_chars: 1000,
        });

        assert!(prompt.starts_with("You are Velorien."));
        assert!(!prompt.contains("turn-1\n"));
        assert!(prompt.contains("User: turn-2"));
        assert!(prompt.contains("User: turn-7"));
        assert!(prompt.contains("User: \"เหงาจัง\""));
        assert!(prompt.ends_with("Note: This is a new user."));
    }

    #[test]
    fn test_persona_turns_use_persona_name() {
        let persona = persona();
        let history = vec![message(Sender::Persona, "สวัสดีจ้า")];
        let prompt = persona_prompt(&PromptContext {
            persona: &persona,
            style: None,
            history: &history,
            user_message: "hi",
            notes: None,
            max_chars: 1000,
        });
        assert!(prompt.contains("Velorien: สวัสดีจ้า"));
        assert!(prompt.ends_with("Velorien:"));
    }

    #[test]
    fn test_improve_prompt_lists_suggestions() {
        let prompt = improve_prompt(
            &persona(),
            "hello",
            "Hi.",
            &["Use fewer stock phrases".to_owned(), "Be warmer".to_owned()],
        );
        assert!(prompt.contains("Original response: \"Hi.\""));
        assert!(prompt.contains("- Use fewer stock phrases\n- Be warmer\n"));
        assert!(prompt.contains("User message: \"hello\""));
    }
}
