// ABOUTME: Core types for the persona chat server
// ABOUTME: Foundation crate with error handling and the shared conversation/session data model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Persona Core
//!
//! Foundation crate providing shared types for the persona chat server.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `GenerationError`
//! - **models**: Personas, conversation memory records and per-user session modes

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Core data models (Persona, ConversationState, UserSessionMode, etc.)
pub mod models;
