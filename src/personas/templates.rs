// ABOUTME: Static response templates keyed by emotion, context and optional conditions
// ABOUTME: Two-stage random selection, first among matching templates then among their candidates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

use crate::models::{ContextualConditions, Emotion, MessageContext, TimeOfDay};
use crate::random::RandomSource;

/// Optional restrictions on when a template applies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConditions {
    /// Only at this time of day
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    /// Only when the user's mood is one of these
    #[serde(default)]
    pub user_mood: Option<Vec<Emotion>>,
}

impl TemplateConditions {
    /// Whether the caller's conditions satisfy these restrictions
    #[must_use]
    pub fn accepts(&self, conditions: &ContextualConditions) -> bool {
        let time_ok = self
            .time_of_day
            .is_none_or(|time| time == conditions.time_of_day);
        let mood_ok = self.user_mood.as_ref().is_none_or(|moods| {
            moods.is_empty() || moods.iter().any(|mood| conditions.user_mood.contains(mood))
        });
        time_ok && mood_ok
    }
}

/// One template with its candidate replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Unique template ID
    pub id: String,
    /// Owning persona
    pub persona_id: String,
    /// Emotion key
    pub emotion: Emotion,
    /// Context key
    pub context: MessageContext,
    /// Replies, one chosen at random
    pub candidates: Vec<String>,
    /// Optional applicability restrictions
    #[serde(default)]
    pub conditions: Option<TemplateConditions>,
}

impl Template {
    /// Exact `(emotion, context)` match plus condition compatibility
    #[must_use]
    pub fn fits(
        &self,
        emotion: Emotion,
        context: MessageContext,
        conditions: Option<&ContextualConditions>,
    ) -> bool {
        self.emotion == emotion
            && self.context == context
            && match (conditions, &self.conditions) {
                (Some(caller), Some(required)) => required.accepts(caller),
                _ => true,
            }
    }
}

/// Fixed template list of one persona
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateBank {
    templates: Vec<Template>,
}

impl TemplateBank {
    /// Wrap a validated template list
    #[must_use]
    pub const fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// All templates
    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Templates matching `(emotion, context)` and, when given, `conditions`
    pub fn matching<'a>(
        &'a self,
        emotion: Emotion,
        context: MessageContext,
        conditions: Option<&'a ContextualConditions>,
    ) -> impl Iterator<Item = &'a Template> + 'a {
        self.templates
            .iter()
            .filter(move |template| template.fits(emotion, context, conditions))
    }

    /// Pick a reply, or `None` when no template matches
    ///
    /// The reply borrows from the bank only, so `conditions` may be a temporary.
    #[must_use]
    pub fn select(
        &self,
        emotion: Emotion,
        context: MessageContext,
        conditions: Option<&ContextualConditions>,
        random: &dyn RandomSource,
    ) -> Option<&str> {
        let matching: Vec<&Template> = self
            .templates
            .iter()
            .filter(|template| template.fits(emotion, context, conditions))
            .collect();
        if matching.is_empty() {
            return None;
        }
        let template = matching[random.pick(matching.len())];
        if template.candidates.is_empty() {
            return None;
        }
        Some(template.candidates[random.pick(template.candidates.len())].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationLength, ConversationMood, RelationshipLevel};

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_f64(&self) -> f64 {
            self.0
        }
    }

    fn template(id: &str, time: Option<TimeOfDay>, candidates: &[&str]) -> Template {
        Template {
            id: id.to_owned(),
            persona_id: "velorien".to_owned(),
            emotion: Emotion::Stressed,
            context: MessageContext::UserExpressesStress,
            candidates: candidates.iter().map(|c| (*c).to_owned()).collect(),
            conditions: time.map(|time| TemplateConditions {
                time_of_day: Some(time),
                user_mood: None,
            }),
        }
    }

    fn conditions_at(time_of_day: TimeOfDay) -> ContextualConditions {
        ContextualConditions {
            time_of_day,
            user_mood: vec![Emotion::Stressed],
            conversation_length: ConversationLength::Short,
            relationship_level: RelationshipLevel::New,
            conversation_mood: ConversationMood::Neutral,
            recent_topics: Vec::new(),
        }
    }

    #[test]
    fn test_time_condition_filters() {
        let bank = TemplateBank::new(vec![
            template("any", None, &["a1", "a2"]),
            template("night", Some(TimeOfDay::Night), &["n1"]),
        ]);
        let morning = conditions_at(TimeOfDay::Morning);
        let picked = bank.select(
            Emotion::Stressed,
            MessageContext::UserExpressesStress,
            Some(&morning),
            &Fixed(0.99),
        );
        assert_eq!(picked, Some("a2"));

        let night = conditions_at(TimeOfDay::Night);
        assert_eq!(
            bank.matching(Emotion::Stressed, MessageContext::UserExpressesStress, Some(&night))
                .count(),
            2
        );
    }

    #[test]
    fn test_selected_reply_outlives_conditions() {
        let bank = TemplateBank::new(vec![template("night", Some(TimeOfDay::Night), &["n1"])]);
        let picked = {
            let night = conditions_at(TimeOfDay::Night);
            bank.select(
                Emotion::Stressed,
                MessageContext::UserExpressesStress,
                Some(&night),
                &Fixed(0.0),
            )
        };
        assert_eq!(picked, Some("n1"));
    }

    #[test]
    fn test_no_match_returns_none() {
        let bank = TemplateBank::new(vec![template("any", None, &["a1"])]);
        assert_eq!(
            bank.select(Emotion::Happy, MessageContext::UserGreets, None, &Fixed(0.0)),
            None
        );
    }

    #[test]
    fn test_mood_condition_requires_intersection() {
        let required = TemplateConditions {
            time_of_day: None,
            user_mood: Some(vec![Emotion::Sad, Emotion::Lonely]),
        };
        assert!(!required.accepts(&conditions_at(TimeOfDay::Evening)));

        let mut lonely = conditions_at(TimeOfDay::Evening);
        lonely.user_mood = vec![Emotion::Lonely];
        assert!(required.accepts(&lonely));
    }
}
