// ABOUTME: Domain service layer behind the HTTP routes
// ABOUTME: Inbound dispatch, persona response generation, human escalation and info mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain service layer
//!
//! Route handlers stay thin and delegate here.

/// Inbound event dispatch and slash commands
pub mod dispatch;

/// Human operator escalation
pub mod escalation;

/// Persona response generation
pub mod generation;

/// Info-mode answers from static content
pub mod info;
