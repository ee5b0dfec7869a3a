// ABOUTME: Shared setup for integration tests: quiet logging, personas and wired-up services
// ABOUTME: Builds orchestrators and resources over scripted backends and in-memory stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `persona_chat_server`

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use persona_chat_server::catalog::PersonaCatalog;
use persona_chat_server::config::GenerationSettings;
use persona_chat_server::llm::GenerativeBackend;
use persona_chat_server::memory::ConversationMemory;
use persona_chat_server::models::Persona;
use persona_chat_server::personas::PersonaRegistry;
use persona_chat_server::random::RandomSource;
use persona_chat_server::services::generation::GenerationOrchestrator;
use persona_chat_server::store::MemoryStore;
use persona_chat_server::test_utils::{fast_generation_settings, persona_catalog};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Counts ERROR events seen by the subscriber it is layered on
#[derive(Debug, Clone, Default)]
pub struct ErrorEventCounter(Arc<AtomicUsize>);

impl ErrorEventCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorEventCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Active persona from the repository catalog
pub async fn persona(name_or_id: &str) -> Result<Persona> {
    persona_catalog()?
        .find_active_persona(name_or_id)
        .await?
        .with_context(|| format!("persona {name_or_id} missing from catalog"))
}

/// Empty conversation memory
pub fn memory(random: Arc<dyn RandomSource>) -> ConversationMemory {
    ConversationMemory::new(Arc::new(MemoryStore::new()), random)
}

/// Orchestrator with built-in bundles and no retry delay
pub fn orchestrator(
    backend: Arc<dyn GenerativeBackend>,
    random: Arc<dyn RandomSource>,
) -> Result<GenerationOrchestrator> {
    orchestrator_with(backend, random, fast_generation_settings())
}

/// Orchestrator with explicit settings
pub fn orchestrator_with(
    backend: Arc<dyn GenerativeBackend>,
    random: Arc<dyn RandomSource>,
    settings: GenerationSettings,
) -> Result<GenerationOrchestrator> {
    Ok(GenerationOrchestrator::new(
        backend,
        memory(Arc::clone(&random)),
        Arc::new(PersonaRegistry::builtin()?),
        random,
        settings,
    ))
}
