// ABOUTME: Shared server resources assembled once at startup and handed to route handlers
// ABOUTME: Builder wires stores, memory, orchestrator, escalation and dispatch with overridable collaborators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::catalog::PersonaCatalog;
use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{GenerativeBackend, SafetySettings};
use crate::memory::ConversationMemory;
use crate::notifications::{InMemoryNotificationSink, NotificationSink};
use crate::personas::PersonaRegistry;
use crate::random::{RandomSource, ThreadRandom};
use crate::services::dispatch::ChatbotService;
use crate::services::escalation::EscalationCoordinator;
use crate::services::generation::GenerationOrchestrator;
use crate::services::info::InfoResponder;
use crate::session::SessionStore;
use crate::store::MemoryStore;
use crate::transport::{LoggingTransport, MessagingTransport};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Inbound event dispatch
    pub chatbot: ChatbotService,
    /// Generative backend, checked by `/ready`
    pub backend: Arc<dyn GenerativeBackend>,
    /// Process start time
    pub started_at: DateTime<Utc>,
}

impl ServerResources {
    /// Start building resources
    #[must_use]
    pub fn builder() -> ServerResourcesBuilder {
        ServerResourcesBuilder::new()
    }

    /// Escalation coordinator used by the admin endpoints
    #[must_use]
    pub const fn escalation(&self) -> &EscalationCoordinator {
        self.chatbot.escalation()
    }
}

/// Builder for [`ServerResources`]
///
/// Config, catalog and backend are required. Everything else defaults to the
/// in-process implementation.
#[derive(Default)]
pub struct ServerResourcesBuilder {
    config: Option<ServerConfig>,
    catalog: Option<Arc<dyn PersonaCatalog>>,
    backend: Option<Arc<dyn GenerativeBackend>>,
    registry: Option<Arc<PersonaRegistry>>,
    transport: Option<Arc<dyn MessagingTransport>>,
    sink: Option<Arc<dyn NotificationSink>>,
    random: Option<Arc<dyn RandomSource>>,
    info: Option<InfoResponder>,
    safety: Option<SafetySettings>,
}

impl ServerResourcesBuilder {
    /// Empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Server configuration
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Persona catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn PersonaCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Generative backend
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn GenerativeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Persona registry; defaults to the built-in bundles
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<PersonaRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Outbound transport; defaults to [`LoggingTransport`]
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn MessagingTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Operator notification sink
    #[must_use]
    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Random source for template gating and selection
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Info-mode content; defaults to an empty catalog
    #[must_use]
    pub fn with_info(mut self, info: InfoResponder) -> Self {
        self.info = Some(info);
        self
    }

    /// Safety thresholds sent with every generation call
    #[must_use]
    pub fn with_safety(mut self, safety: SafetySettings) -> Self {
        self.safety = Some(safety);
        self
    }

    /// Assemble the resources
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when a required part is absent, or the
    /// registry's error when the built-in bundles fail to load
    pub fn build(self) -> AppResult<ServerResources> {
        let config = self.config.ok_or_else(|| missing("config"))?;
        let catalog = self.catalog.ok_or_else(|| missing("persona catalog"))?;
        let backend = self.backend.ok_or_else(|| missing("generative backend"))?;
        let registry = match self.registry {
            Some(registry) => registry,
            None => Arc::new(PersonaRegistry::builtin()?),
        };
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(LoggingTransport));
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(InMemoryNotificationSink::new()));
        let random = self.random.unwrap_or_else(|| Arc::new(ThreadRandom));

        let memory = ConversationMemory::new(Arc::new(MemoryStore::new()), Arc::clone(&random));
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let orchestrator = GenerationOrchestrator::new(
            Arc::clone(&backend),
            memory,
            registry,
            random,
            config.generation.clone(),
        )
        .with_safety(self.safety.unwrap_or_default());
        let escalation = EscalationCoordinator::new(sessions.clone(), sink);
        let chatbot = ChatbotService::new(
            catalog,
            sessions,
            escalation,
            orchestrator,
            Arc::new(self.info.unwrap_or_default()),
            transport,
        );

        Ok(ServerResources {
            config: Arc::new(config),
            chatbot,
            backend,
            started_at: Utc::now(),
        })
    }
}

fn missing(part: &str) -> AppError {
    AppError::new(
        ErrorCode::ConfigMissing,
        format!("Server resources require a {part}"),
    )
}
