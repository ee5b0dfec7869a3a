// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into typed server, Gemini and generation settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management for production deployment

use std::env;
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::constants::{defaults, env_config, limits};

/// Gemini backend settings
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key, never logged
    pub api_key: String,
    /// Model name
    pub model: String,
}

impl Debug for GeminiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Tunables of the generation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Attempts per generation call, at least 1
    pub max_attempts: u32,
    /// Linear backoff unit between attempts
    pub retry_delay: Duration,
    /// Upper bound for a single backend call
    pub attempt_timeout: Duration,
    /// Chance of considering the template path at all
    pub template_gate_probability: f64,
    /// Accepted text is truncated beyond this many characters
    pub max_response_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_attempts: defaults::GENERATION_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(defaults::GENERATION_RETRY_DELAY_MS),
            attempt_timeout: Duration::from_secs(defaults::GENERATION_TIMEOUT_SECS),
            template_gate_probability: defaults::TEMPLATE_GATE_PROBABILITY,
            max_response_chars: limits::MAX_RESPONSE_CHARS,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Gemini backend settings
    pub gemini: GeminiConfig,
    /// Generation pipeline tunables
    pub generation: GenerationSettings,
    /// Directory of persona markdown files
    pub personas_dir: PathBuf,
    /// Info-mode YAML content
    pub info_content_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is missing or empty
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is missing or empty
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(env_config::GEMINI_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("{} must be set", env_config::GEMINI_API_KEY))?;

        let max_attempts = parse_or_default(
            &lookup,
            env_config::GENERATION_MAX_ATTEMPTS,
            defaults::GENERATION_MAX_ATTEMPTS,
        )
        .max(1);

        let template_gate_probability = parse_or_default(
            &lookup,
            env_config::TEMPLATE_GATE_PROBABILITY,
            defaults::TEMPLATE_GATE_PROBABILITY,
        );
        let template_gate_probability = if (0.0..=1.0).contains(&template_gate_probability) {
            template_gate_probability
        } else {
            warn!(
                value = template_gate_probability,
                "{} out of range, using default",
                env_config::TEMPLATE_GATE_PROBABILITY
            );
            defaults::TEMPLATE_GATE_PROBABILITY
        };

        Ok(Self {
            http_port: parse_or_default(&lookup, env_config::HTTP_PORT, defaults::HTTP_PORT),
            gemini: GeminiConfig {
                api_key,
                model: lookup(env_config::GEMINI_MODEL)
                    .unwrap_or_else(|| defaults::GEMINI_MODEL.to_owned()),
            },
            generation: GenerationSettings {
                max_attempts,
                retry_delay: Duration::from_millis(parse_or_default(
                    &lookup,
                    env_config::GENERATION_RETRY_DELAY_MS,
                    defaults::GENERATION_RETRY_DELAY_MS,
                )),
                attempt_timeout: Duration::from_secs(parse_or_default(
                    &lookup,
                    env_config::GENERATION_TIMEOUT_SECS,
                    defaults::GENERATION_TIMEOUT_SECS,
                )),
                template_gate_probability,
                max_response_chars: parse_or_default(
                    &lookup,
                    env_config::MAX_RESPONSE_CHARS,
                    limits::MAX_RESPONSE_CHARS,
                ),
            },
            personas_dir: PathBuf::from(
                lookup(env_config::PERSONAS_DIR)
                    .unwrap_or_else(|| defaults::PERSONAS_DIR.to_owned()),
            ),
            info_content_path: PathBuf::from(
                lookup(env_config::INFO_CONTENT_PATH)
                    .unwrap_or_else(|| defaults::INFO_CONTENT_PATH.to_owned()),
            ),
        })
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Persona Chat Server Configuration: HTTP Port: {}, Gemini Model: {}, Attempts: {}, \
             Retry Delay: {}ms, Attempt Timeout: {}s, Template Gate: {}, Max Response: {} chars, \
             Personas: {}, Info Content: {}",
            self.http_port,
            self.gemini.model,
            self.generation.max_attempts,
            self.generation.retry_delay.as_millis(),
            self.generation.attempt_timeout.as_secs(),
            self.generation.template_gate_probability,
            self.generation.max_response_chars,
            self.personas_dir.display(),
            self.info_content_path.display(),
        )
    }
}

/// Parse a variable, falling back to `default` (with a warning) when it is malformed
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = key, value = %raw, "Invalid value, using default");
            default
        }),
    }
}
