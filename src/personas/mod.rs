// ABOUTME: Persona definitions, style profiles and template banks
// ABOUTME: Markdown persona parser plus the typed registry of per-persona bundles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Personas
//!
//! Persona identity lives in markdown files (see [`parser`]); voice and canned
//! replies live in YAML bundles compiled into the binary (see [`registry`]).
//! A persona without a bundle is served by the generative path only.

/// Persona markdown parsing
pub mod parser;
/// Bundle registry
pub mod registry;
/// Style profiles
pub mod styles;
/// Template bank
pub mod templates;

pub use parser::{parse_persona_content, parse_persona_file, PersonaDefinition};
pub use registry::{PersonaBundle, PersonaRegistry};
pub use styles::{EmojiUsage, PersonalityMarkers, StyleProfile};
pub use templates::{Template, TemplateBank, TemplateConditions};
