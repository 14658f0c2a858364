// ABOUTME: HTTP server binary for the FitVoice coaching service
// ABOUTME: Loads configuration, connects SQLite, selects the LLM provider, and serves the API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `FitVoice` Server Binary
//!
//! Serves `/api/chat`, `/api/generate-program`, `/api/plans/:user_id`,
//! `/clerk-webhook` and `/health`.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use fitvoice_server::{
    config::ServerConfig,
    database::SqliteStore,
    llm::{ChatProvider, LlmProvider},
    logging::LoggingConfig,
    resources::ServerResources,
    server,
};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "fitvoice-server")]
#[command(about = "FitVoice - voice-driven fitness intake and plan generation API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!("Starting FitVoice Server");
    info!("{}", config.summary());

    let store = SqliteStore::connect(&config.database_url).await?;
    info!("Database initialized: {}", config.database_url);

    let llm = ChatProvider::from_config(&config.llm)?;
    match llm.health_check().await {
        Ok(true) => info!("LLM provider ready: {}", llm.display_name()),
        Ok(false) => warn!("{} rejected the health check; chat and plan calls may fail", llm.display_name()),
        Err(e) => warn!("{} unreachable at startup: {e}", llm.display_name()),
    }

    let resources = Arc::new(ServerResources::new(
        config,
        Arc::new(llm),
        Arc::new(store),
    )?);

    if let Err(e) = server::serve(resources).await {
        error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}
