// ABOUTME: Read-only persona catalog interface used by the chat pipeline
// ABOUTME: In-memory implementation loaded from a directory of persona markdown files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::Persona;
use crate::personas::{parse_persona_file, PersonaDefinition};

/// Lookup of active personas
#[async_trait]
pub trait PersonaCatalog: Send + Sync {
    /// Active persona whose id, name or alias matches (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store fails
    async fn find_active_persona(&self, name_or_id: &str) -> AppResult<Option<Persona>>;

    /// All active personas in catalog order
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store fails
    async fn list_active_personas(&self) -> AppResult<Vec<Persona>>;
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonaCatalog {
    definitions: Vec<PersonaDefinition>,
    personas: Vec<Persona>,
}

impl InMemoryPersonaCatalog {
    /// Catalog from parsed definitions
    #[must_use]
    pub fn from_definitions(definitions: Vec<PersonaDefinition>) -> Self {
        let personas = definitions.iter().map(PersonaDefinition::to_persona).collect();
        Self {
            definitions,
            personas,
        }
    }

    /// Load every `*.md` file in `dir`, sorted by filename
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be read, the parser's
    /// error for an invalid file, or `ConfigInvalid` for duplicate ids
    pub fn from_dir(dir: &Path) -> AppResult<Self> {
        let entries = fs::read_dir(dir).map_err(|e| {
            AppError::new(
                ErrorCode::StorageError,
                format!("Failed to read persona directory {}: {e}", dir.display()),
            )
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        let mut definitions: Vec<PersonaDefinition> = Vec::with_capacity(paths.len());
        for path in &paths {
            let definition = parse_persona_file(path)?;
            if definitions
                .iter()
                .any(|d| d.frontmatter.id == definition.frontmatter.id)
            {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Duplicate persona id '{}'", definition.frontmatter.id),
                ));
            }
            if !definition.frontmatter.active {
                warn!(persona_id = %definition.frontmatter.id, "Persona is inactive");
            }
            definitions.push(definition);
        }

        info!(
            directory = %dir.display(),
            personas = definitions.len(),
            "Loaded persona catalog"
        );
        Ok(Self::from_definitions(definitions))
    }

    /// Parsed definitions, including inactive ones
    #[must_use]
    pub fn definitions(&self) -> &[PersonaDefinition] {
        &self.definitions
    }
}

#[async_trait]
impl PersonaCatalog for InMemoryPersonaCatalog {
    async fn find_active_persona(&self, name_or_id: &str) -> AppResult<Option<Persona>> {
        Ok(self
            .personas
            .iter()
            .find(|persona| persona.is_active && persona.matches(name_or_id))
            .cloned())
    }

    async fn list_active_personas(&self) -> AppResult<Vec<Persona>> {
        Ok(self
            .personas
            .iter()
            .filter(|persona| persona.is_active)
            .cloned()
            .collect())
    }
}
