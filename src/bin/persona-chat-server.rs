// ABOUTME: Server binary: loads configuration, personas and info content, then serves the HTTP API
// ABOUTME: Fails fast on invalid persona catalogs and shuts down gracefully on Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Persona Chat Server Binary
//!
//! Starts the webhook, admin and health endpoints with the Gemini backend and
//! the logging transport.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::serve;
use clap::Parser;
use persona_chat_server::catalog::InMemoryPersonaCatalog;
use persona_chat_server::config::ServerConfig;
use persona_chat_server::llm::GeminiBackend;
use persona_chat_server::logging;
use persona_chat_server::personas::PersonaRegistry;
use persona_chat_server::resources::ServerResources;
use persona_chat_server::routes;
use persona_chat_server::services::info::InfoResponder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "persona-chat-server")]
#[command(about = "Persona chat server - AI character chat with human escalation")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the persona markdown directory
    #[arg(long)]
    personas_dir: Option<PathBuf>,

    /// Override the info-mode content file
    #[arg(long)]
    info_content: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(dir) = args.personas_dir {
        config.personas_dir = dir;
    }
    if let Some(path) = args.info_content {
        config.info_content_path = path;
    }
    info!("{}", config.summary());

    let catalog = InMemoryPersonaCatalog::from_dir(&config.personas_dir)
        .with_context(|| format!("loading personas from {}", config.personas_dir.display()))?;
    let registry = PersonaRegistry::builtin()?;
    registry.validate_catalog(catalog.definitions())?;
    info!(bundles = ?registry.persona_ids(), "Persona catalog validated");

    let info_responder = match InfoResponder::from_path(&config.info_content_path) {
        Ok(responder) => responder,
        Err(e) => {
            warn!(error = %e, "Info content unavailable, info mode will report no data");
            InfoResponder::default()
        }
    };

    let port = config.http_port;
    let backend = GeminiBackend::from_config(&config.gemini);
    let resources = ServerResources::builder()
        .with_backend(Arc::new(backend))
        .with_catalog(Arc::new(catalog))
        .with_registry(Arc::new(registry))
        .with_info(info_responder)
        .with_config(config)
        .build()?;

    let app = routes::router(Arc::new(resources));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Persona chat server listening");

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
