// ABOUTME: Main library entry point for the persona chat server
// ABOUTME: Webhook chatbot answering as AI personas, with templates, validation and human escalation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Persona Chat Server
//!
//! A webhook chatbot that answers users as one of several AI personas.
//!
//! ## Features
//!
//! - **Personas**: markdown persona definitions plus typed style and template bundles
//! - **Generation**: template shortcut, retried Gemini generation with fixed fallbacks
//! - **Quality**: rule-based validation with a single improve pass
//! - **Memory**: per-user, per-persona conversation state with preferences
//! - **Escalation**: human operator mode with a prioritised pending queue
//!
//! ## Architecture
//!
//! - **Routes**: webhook, admin and health endpoints on axum
//! - **Services**: dispatch, generation, escalation and info mode
//! - **Store**: versioned key-value store with compare-and-swap updates
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use persona_chat_server::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Persona chat server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Persona catalog interface and file-backed implementation
pub mod catalog;

/// Configuration loaded from the environment
pub mod config;

/// Limits, defaults, environment variable names and reply strings
pub mod constants;

/// Unified error handling
pub mod errors;

/// Emotion and context classification, text helpers and response validation
pub mod intelligence;

/// Generative backend interface, Gemini client and prompt builders
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Per-user, per-persona conversation memory
pub mod memory;

/// Shared data model
pub mod models;

/// Operator notification sink
pub mod notifications;

/// Persona file parser, style profiles, templates and registry
pub mod personas;

/// Injectable randomness
pub mod random;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Domain services: dispatch, generation, escalation, info mode
pub mod services;

/// Per-user session mode store
pub mod session;

/// Versioned key-value store
pub mod store;

/// Outbound messaging transport
pub mod transport;

/// Test doubles shared by unit and integration tests
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
