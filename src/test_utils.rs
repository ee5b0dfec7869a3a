// ABOUTME: Test doubles for the generation pipeline: scripted backend, fixed randomness, recording transport
// ABOUTME: Also builds configuration, catalog and server resources from the repository's persona files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::catalog::InMemoryPersonaCatalog;
use crate::config::{GeminiConfig, GenerationSettings, ServerConfig};
use crate::constants::{defaults, limits};
use crate::errors::{AppError, AppResult, ErrorCode, GenerationError};
use crate::llm::{GenerativeBackend, SafetySettings};
use crate::random::RandomSource;
use crate::resources::ServerResources;
use crate::services::info::InfoResponder;
use crate::transport::{MessagingTransport, OutboundMessage};

/// Backend returning queued results in order, then a default reply
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    default_reply: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    health: Option<GenerationError>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    /// Backend answering every call with `default_reply`
    #[must_use]
    pub fn new(default_reply: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: default_reply.to_owned(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            health: None,
            delay: None,
        }
    }

    /// Backend answering with `results` first
    #[must_use]
    pub fn with_script(
        default_reply: &str,
        results: impl IntoIterator<Item = Result<String, GenerationError>>,
    ) -> Self {
        let backend = Self::new(default_reply);
        Self {
            script: Mutex::new(results.into_iter().collect()),
            ..backend
        }
    }

    /// Make `health_check` fail with `error`
    #[must_use]
    pub fn unhealthy(mut self, error: GenerationError) -> Self {
        self.health = Some(error);
        self
    }

    /// Sleep for `delay` before answering each call
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        _safety: &SafetySettings,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_owned());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_reply.clone()))
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        self.health.clone().map_or(Ok(()), Err)
    }
}

/// Always returns the same draw
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}

/// Cycles through a fixed list of draws
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<f64>,
    index: AtomicUsize,
}

impl SequenceRandom {
    /// Sequence over `values`; an empty list behaves like `FixedRandom(0.0)`
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            index: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let index = self.index.fetch_add(1, Ordering::SeqCst) % self.values.len();
        self.values[index]
    }
}

/// Transport keeping every message in memory
#[derive(Debug, Default)]
pub struct RecordingTransport {
    replies: Mutex<Vec<(String, OutboundMessage)>>,
    pushes: Mutex<Vec<(String, OutboundMessage)>>,
    failing: bool,
}

impl RecordingTransport {
    /// Transport accepting every message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport rejecting every message
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Replies as `(reply_token, message)`
    pub async fn replies(&self) -> Vec<(String, OutboundMessage)> {
        self.replies.lock().await.clone()
    }

    /// Pushes as `(user_id, message)`
    pub async fn pushes(&self) -> Vec<(String, OutboundMessage)> {
        self.pushes.lock().await.clone()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing {
            return Err(AppError::new(
                ErrorCode::ExternalServiceError,
                "transport unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingTransport for RecordingTransport {
    async fn reply(&self, reply_token: &str, message: &OutboundMessage) -> AppResult<()> {
        self.check()?;
        self.replies
            .lock()
            .await
            .push((reply_token.to_owned(), message.clone()));
        Ok(())
    }

    async fn push(&self, user_id: &str, message: &OutboundMessage) -> AppResult<()> {
        self.check()?;
        self.pushes
            .lock()
            .await
            .push((user_id.to_owned(), message.clone()));
        Ok(())
    }
}

/// Repository root
#[must_use]
pub fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// Generation settings without backoff delays
#[must_use]
pub fn fast_generation_settings() -> GenerationSettings {
    GenerationSettings {
        max_attempts: defaults::GENERATION_MAX_ATTEMPTS,
        retry_delay: Duration::ZERO,
        attempt_timeout: Duration::from_secs(defaults::GENERATION_TIMEOUT_SECS),
        template_gate_probability: defaults::TEMPLATE_GATE_PROBABILITY,
        max_response_chars: limits::MAX_RESPONSE_CHARS,
    }
}

/// Configuration pointing at the repository's personas and content
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: defaults::HTTP_PORT,
        gemini: GeminiConfig {
            api_key: "test-key".to_owned(),
            model: defaults::GEMINI_MODEL.to_owned(),
        },
        generation: fast_generation_settings(),
        personas_dir: repo_path(defaults::PERSONAS_DIR),
        info_content_path: repo_path(defaults::INFO_CONTENT_PATH),
    }
}

/// Catalog of the repository's persona files
///
/// # Errors
///
/// Returns the loader's error
pub fn persona_catalog() -> AppResult<InMemoryPersonaCatalog> {
    InMemoryPersonaCatalog::from_dir(&repo_path(defaults::PERSONAS_DIR))
}

/// Info responder over the repository's content file
///
/// # Errors
///
/// Returns the loader's error
pub fn info_responder() -> AppResult<InfoResponder> {
    InfoResponder::from_path(&repo_path(defaults::INFO_CONTENT_PATH))
}

/// Resources over the given doubles, the repository's personas and content
///
/// # Errors
///
/// Returns the loader's or the builder's error
pub fn test_resources(
    backend: Arc<dyn GenerativeBackend>,
    random: Arc<dyn RandomSource>,
    transport: Arc<dyn MessagingTransport>,
) -> AppResult<ServerResources> {
    ServerResources::builder()
        .with_config(test_config())
        .with_catalog(Arc::new(persona_catalog()?))
        .with_backend(backend)
        .with_random(random)
        .with_transport(transport)
        .with_info(info_responder()?)
        .build()
}
