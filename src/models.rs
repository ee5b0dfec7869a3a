// ABOUTME: Re-export of the shared conversation, persona and session data model
// ABOUTME: Types are defined in persona-core so the HTTP layer and services share one definition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub use persona_core::models::*;
