// ABOUTME: Configuration management module for server settings
// ABOUTME: Environment-driven server, backend and generation pipeline configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration module
//!
//! - **Environment**: `ServerConfig::from_env` with per-variable defaults

/// Environment and server configuration
pub mod environment;

pub use environment::{GeminiConfig, GenerationSettings, ServerConfig};
