// ABOUTME: Shared helpers for HTTP-level integration tests
// ABOUTME: Exports the in-process Axum request runner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
