// ABOUTME: Persona record owned by the admin-managed catalog
// ABOUTME: Read-only identity, personality and prompt fragments for one AI character
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// A named AI character the user can chat with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier (lowercase, e.g. `velorien`)
    pub id: String,
    /// Display name used in prompts and replies
    pub name: String,
    /// Who the persona is
    pub description: String,
    /// How the persona behaves
    pub personality: String,
    /// Persona backstory
    pub background: String,
    /// Character-specific system prompt fragment
    pub prompt: String,
    /// Alternative names accepted by persona lookup
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Inactive personas are hidden from lookup and listing
    pub is_active: bool,
}

impl Persona {
    /// Whether `name_or_id` refers to this persona (case-insensitive)
    #[must_use]
    pub fn matches(&self, name_or_id: &str) -> bool {
        let needle = name_or_id.trim().to_lowercase();
        !needle.is_empty()
            && (self.id.to_lowercase() == needle
                || self.name.to_lowercase() == needle
                || self.aliases.iter().any(|alias| alias.to_lowercase() == needle))
    }
}
