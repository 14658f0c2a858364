// ABOUTME: Terminal voice session binary driving one intake call from the console
// ABOUTME: Talks to a running server over HTTP or runs the coach in-process against SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `FitVoice` Session Binary
//!
//! Each line typed on stdin is one final transcript; coach replies are
//! printed to stdout. Logs go to stderr.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use fitvoice_server::{
    config::{environment::DEFAULT_DATABASE_URL, LlmConfig},
    conversation::ConversationController,
    database::{FitnessStore, SqliteStore},
    llm::{ChatProvider, LlmProvider},
    logging::LoggingConfig,
    services::PlanGenerator,
    session::{CallState, CoachBackend, HttpCoachClient, LocalCoach, SessionOrchestrator},
    voice::{
        console::{ConsoleRecognizer, ConsoleSynthesizer},
        VoiceAssistant,
    },
};
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(name = "fitvoice-session")]
#[command(about = "Run a FitVoice intake call in the terminal")]
pub struct Args {
    /// Identity provider user id the plan is stored under
    #[arg(long)]
    user_id: String,

    /// First name used in the greeting
    #[arg(long)]
    name: Option<String>,

    /// Base URL of a running fitvoice-server; runs in-process when omitted
    #[arg(long)]
    server_url: Option<String>,

    /// Database URL for in-process mode
    #[arg(long, default_value = DEFAULT_DATABASE_URL)]
    database_url: String,
}

async fn build_coach(args: &Args) -> Result<Arc<dyn CoachBackend>> {
    if let Some(url) = &args.server_url {
        info!("Using FitVoice server at {url}");
        return Ok(Arc::new(HttpCoachClient::new(url.as_str())?));
    }

    let llm_config = LlmConfig::from_env()?;
    let provider = ChatProvider::from_config(&llm_config)?;
    info!("Running coach in-process with {}", provider.display_name());

    let llm: Arc<dyn LlmProvider> = Arc::new(provider);
    let store: Arc<dyn FitnessStore> =
        Arc::new(SqliteStore::connect(&args.database_url).await?);

    Ok(Arc::new(LocalCoach::new(
        ConversationController::new(Arc::clone(&llm), llm_config.chat_model.clone()),
        PlanGenerator::new(llm, store, llm_config.plan_model),
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().with_stderr().init()?;

    let coach = build_coach(&args).await?;
    let voice = VoiceAssistant::new(
        Arc::new(ConsoleRecognizer::new()),
        Arc::new(ConsoleSynthesizer::new("Coach")),
    );

    let mut session =
        SessionOrchestrator::new(voice, coach, args.user_id.as_str(), args.name.as_deref());

    let finished = tokio::select! {
        state = session.run() => Some(state),
        _ = signal::ctrl_c() => None,
    };

    let outcome = match finished {
        Some(state) => {
            if let Some(last) = session.transcript().last() {
                println!("{}", last.text);
            }
            state
        }
        None => {
            session.hang_up();
            CallState::Ended
        }
    };

    if let Some(plan) = session.plan() {
        println!("{}", serde_json::to_string_pretty(plan)?);
    }

    info!(state = ?outcome, "Session finished");
    Ok(())
}
