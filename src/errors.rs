// ABOUTME: Re-export of the unified error system from persona-core
// ABOUTME: Lets the server crate refer to errors as crate::errors like the rest of the codebase
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Error types live in `persona_core::errors`; this module re-exports them.

pub use persona_core::errors::*;
