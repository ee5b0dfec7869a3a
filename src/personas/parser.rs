// ABOUTME: Parser for persona markdown files with YAML frontmatter
// ABOUTME: Extracts identity, personality, background and prompt instructions into Persona records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::Persona;

/// YAML frontmatter of a persona file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaFrontmatter {
    /// Identifier, must match the filename stem
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether the persona is offered to users
    #[serde(default = "default_active")]
    pub active: bool,
    /// Persona requires a style and template bundle
    #[serde(default)]
    pub styled: bool,
    /// Alternative lookup names
    #[serde(default)]
    pub aliases: Vec<String>,
}

const fn default_active() -> bool {
    true
}

/// Markdown sections of a persona file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSections {
    /// Who the persona is (Required)
    pub description: String,
    /// How the persona behaves (Required)
    pub personality: String,
    /// Backstory (Required)
    pub background: String,
    /// System prompt fragment (Required)
    pub instructions: String,
}

/// A parsed persona file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaDefinition {
    /// Parsed frontmatter
    pub frontmatter: PersonaFrontmatter,
    /// Parsed sections
    pub sections: PersonaSections,
}

impl PersonaDefinition {
    /// Catalog record for this definition
    #[must_use]
    pub fn to_persona(&self) -> Persona {
        Persona {
            id: self.frontmatter.id.clone(),
            name: self.frontmatter.name.clone(),
            description: self.sections.description.clone(),
            personality: self.sections.personality.clone(),
            background: self.sections.background.clone(),
            prompt: self.sections.instructions.clone(),
            aliases: self.frontmatter.aliases.clone(),
            is_active: self.frontmatter.active,
        }
    }
}

/// Parse YAML frontmatter from markdown content
///
/// # Errors
/// Returns error if frontmatter delimiters are missing or YAML is invalid
pub fn parse_frontmatter(content: &str) -> AppResult<PersonaFrontmatter> {
    let content = content.trim();

    let after_first = content.strip_prefix("---").ok_or_else(|| {
        AppError::new(
            ErrorCode::InvalidFormat,
            "Persona file must start with YAML frontmatter (---)",
        )
    })?;

    let end_pos = after_first.find("\n---").ok_or_else(|| {
        AppError::new(
            ErrorCode::InvalidFormat,
            "Persona file missing closing frontmatter delimiter (---)",
        )
    })?;

    serde_yaml::from_str(after_first[..end_pos].trim()).map_err(|e| {
        AppError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid YAML frontmatter: {e}"),
        )
    })
}

/// Parse markdown sections from content (after frontmatter)
///
/// # Errors
/// Returns error if any of the four required sections is missing or empty
pub fn parse_sections(content: &str) -> AppResult<PersonaSections> {
    let content = content.trim();

    let body = content.strip_prefix("---").map_or(content, |after_first| {
        after_first
            .find("\n---")
            .map_or(content, |end_pos| after_first[end_pos + 4..].trim())
    });

    let mut sections = PersonaSections::default();
    let mut current_section: Option<&str> = None;
    let mut current_content = String::new();

    for line in body.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            if let Some(section_name) = current_section {
                save_section(&mut sections, section_name, &current_content);
            }
            current_section = Some(header.trim());
            current_content.clear();
        } else if current_section.is_some() {
            if !current_content.is_empty() {
                current_content.push('\n');
            }
            current_content.push_str(line);
        }
    }

    if let Some(section_name) = current_section {
        save_section(&mut sections, section_name, &current_content);
    }

    for (name, value) in [
        ("Description", &sections.description),
        ("Personality", &sections.personality),
        ("Background", &sections.background),
        ("Instructions", &sections.instructions),
    ] {
        if value.is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                format!("Persona file missing required section: ## {name}"),
            ));
        }
    }

    Ok(sections)
}

fn save_section(sections: &mut PersonaSections, name: &str, content: &str) {
    let trimmed = content.trim();

    match name {
        "Description" => trimmed.clone_into(&mut sections.description),
        "Personality" => trimmed.clone_into(&mut sections.personality),
        "Background" => trimmed.clone_into(&mut sections.background),
        "Instructions" => trimmed.clone_into(&mut sections.instructions),
        _ => {}
    }
}

/// Parse persona definition from markdown string content
///
/// # Errors
/// Returns error if content is invalid
pub fn parse_persona_content(content: &str) -> AppResult<PersonaDefinition> {
    Ok(PersonaDefinition {
        frontmatter: parse_frontmatter(content)?,
        sections: parse_sections(content)?,
    })
}

/// Parse a complete persona markdown file
///
/// # Errors
/// Returns error if the file cannot be read, its content is invalid, or its
/// `id` does not match the filename
pub fn parse_persona_file(path: &Path) -> AppResult<PersonaDefinition> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorCode::StorageError,
            format!("Failed to read persona file {}: {e}", path.display()),
        )
    })?;

    let definition = parse_persona_content(&content)?;

    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::new(ErrorCode::InvalidFormat, "Invalid persona filename"))?;

    if definition.frontmatter.id != filename {
        return Err(AppError::new(
            ErrorCode::InvalidFormat,
            format!(
                "Persona id '{}' does not match filename '{filename}'",
                definition.frontmatter.id
            ),
        ));
    }

    Ok(definition)
}
