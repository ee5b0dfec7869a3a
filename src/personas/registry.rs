// ABOUTME: Typed registry mapping persona identifiers to their style profile and template bank
// ABOUTME: Bundles are embedded YAML validated at startup so unknown or mismatched personas fail fast
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info};

use super::parser::PersonaDefinition;
use super::styles::StyleProfile;
use super::templates::{Template, TemplateBank};
use crate::errors::{AppError, AppResult, ErrorCode};

const VELORIEN_BUNDLE: &str = include_str!("../../personas/bundles/velorien.yaml");
const SHERLOCK_BUNDLE: &str = include_str!("../../personas/bundles/sherlock.yaml");
const HERMIONE_BUNDLE: &str = include_str!("../../personas/bundles/hermione.yaml");

#[derive(Debug, Deserialize)]
struct RawBundle {
    persona_id: String,
    style: StyleProfile,
    #[serde(default)]
    templates: Vec<Template>,
}

/// Style profile and templates of one persona
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaBundle {
    /// Owning persona
    pub persona_id: String,
    /// Validator style profile
    pub style: StyleProfile,
    /// Template bank
    pub templates: TemplateBank,
}

impl PersonaBundle {
    /// Parse and validate a bundle document
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for malformed YAML and `ConfigInvalid` when a
    /// template or the style belongs to another persona or a template has no
    /// candidates
    pub fn from_yaml(document: &str) -> AppResult<Self> {
        let raw: RawBundle = serde_yaml::from_str(document).map_err(|e| {
            AppError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid persona bundle: {e}"),
            )
        })?;

        let persona_id = raw.persona_id.to_lowercase();
        let mut style = raw.style;
        if style.persona_id.is_empty() {
            style.persona_id.clone_from(&persona_id);
        } else if style.persona_id.to_lowercase() != persona_id {
            return Err(AppError::new(
                ErrorCode::ConfigInvalid,
                format!(
                    "Style profile of bundle '{persona_id}' belongs to '{}'",
                    style.persona_id
                ),
            ));
        }

        for template in &raw.templates {
            if template.persona_id.to_lowercase() != persona_id {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!(
                        "Template '{}' in bundle '{persona_id}' belongs to '{}'",
                        template.id, template.persona_id
                    ),
                ));
            }
            if template.candidates.is_empty() {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Template '{}' has no candidate replies", template.id),
                ));
            }
        }

        Ok(Self {
            persona_id,
            style,
            templates: TemplateBank::new(raw.templates),
        })
    }
}

/// Persona identifier to bundle map
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    bundles: HashMap<String, PersonaBundle>,
}

impl PersonaRegistry {
    /// Registry of the bundled personas (Velorien, Sherlock, Hermione)
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded bundle is invalid
    pub fn builtin() -> AppResult<Self> {
        Self::from_documents(&[VELORIEN_BUNDLE, SHERLOCK_BUNDLE, HERMIONE_BUNDLE])
    }

    /// Registry from YAML bundle documents
    ///
    /// # Errors
    ///
    /// Returns an error if a document is invalid or two documents declare the
    /// same persona
    pub fn from_documents(documents: &[&str]) -> AppResult<Self> {
        let mut bundles = HashMap::new();
        for document in documents {
            let bundle = PersonaBundle::from_yaml(document)?;
            debug!(
                persona_id = %bundle.persona_id,
                templates = bundle.templates.templates().len(),
                "Loaded persona bundle"
            );
            if bundles.contains_key(&bundle.persona_id) {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Duplicate bundle for persona '{}'", bundle.persona_id),
                ));
            }
            bundles.insert(bundle.persona_id.clone(), bundle);
        }
        Ok(Self { bundles })
    }

    /// Bundle of a persona
    #[must_use]
    pub fn get(&self, persona_id: &str) -> Option<&PersonaBundle> {
        self.bundles.get(&persona_id.to_lowercase())
    }

    /// Style profile of a persona
    #[must_use]
    pub fn style(&self, persona_id: &str) -> Option<&StyleProfile> {
        self.get(persona_id).map(|bundle| &bundle.style)
    }

    /// Identifiers with a bundle
    #[must_use]
    pub fn persona_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Check the catalog against the registry
    ///
    /// Every active persona marked `styled` must have a bundle.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first styled persona without a bundle
    pub fn validate_catalog(&self, definitions: &[PersonaDefinition]) -> AppResult<()> {
        for definition in definitions {
            let frontmatter = &definition.frontmatter;
            if frontmatter.active && frontmatter.styled && self.get(&frontmatter.id).is_none() {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!(
                        "Persona '{}' requires a style bundle but none is registered",
                        frontmatter.id
                    ),
                ));
            }
        }
        info!(
            personas = definitions.len(),
            bundles = self.bundles.len(),
            "Persona registry validated against catalog"
        );
        Ok(())
    }
}
