// ABOUTME: Session orchestrator wiring speech events to the coach and plan generation
// ABOUTME: Tracks call state, keeps LLM history apart from the display transcript
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Orchestrator
//!
//! One orchestrator drives one call. Every model call happens with listening
//! paused, so no two coach calls are ever in flight for a session.
//!
//! ```text
//! Idle -> Connecting -> Active <-> Processing -> Ended
//! ```
//!
//! Conversation errors add an apology to the transcript and return to
//! `Active`. A terminal speech error (no recognizer, blocked or missing
//! microphone) drops the call back to `Idle`. Plan generation failures end
//! the call with a failure message and are not retried.

mod client;
mod coach;

pub use client::HttpCoachClient;
pub use coach::{CoachBackend, LocalCoach};

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};

use crate::conversation::display_name;
use crate::llm::ChatMessage;
use crate::models::GeneratedPlan;
use crate::voice::{VoiceAssistant, VoiceEvent};

/// Spoken and shown when a conversation turn fails
pub const TURN_APOLOGY: &str =
    "Sorry, I had trouble processing that. Could you say it again?";

/// Shown when plan generation fails
pub const GENERATION_FAILURE: &str =
    "Sorry, I couldn't generate your plan right now. Please start a new session to try again.";

/// Shown once the plan is stored
pub const PLAN_READY: &str = "Your personalized program is ready! You can find it on your profile.";

/// Call lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    /// No call
    Idle,
    /// Fetching and speaking the greeting
    Connecting,
    /// Listening for the user
    Active,
    /// Waiting on the coach or plan generation
    Processing,
    /// Call finished
    Ended,
}

/// Who a transcript line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The user
    User,
    /// The coach, including apologies and status lines
    Coach,
}

/// One line of the display transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Speaker
    pub speaker: Speaker,
    /// Text shown
    pub text: String,
}

/// Drives one voice intake call
pub struct SessionOrchestrator {
    voice: VoiceAssistant,
    coach: Arc<dyn CoachBackend>,
    user_id: String,
    user_name: String,
    state: CallState,
    speaking: bool,
    history: Vec<ChatMessage>,
    transcript: Vec<TranscriptEntry>,
    plan: Option<GeneratedPlan>,
}

impl SessionOrchestrator {
    /// Create an orchestrator for `user_id`, greeting them by `first_name`
    #[must_use]
    pub fn new(
        voice: VoiceAssistant,
        coach: Arc<dyn CoachBackend>,
        user_id: impl Into<String>,
        first_name: Option<&str>,
    ) -> Self {
        Self {
            voice,
            coach,
            user_id: user_id.into(),
            user_name: display_name(first_name).to_owned(),
            state: CallState::Idle,
            speaking: false,
            history: Vec::new(),
            transcript: Vec::new(),
            plan: None,
        }
    }

    /// Current call state
    #[must_use]
    pub const fn state(&self) -> CallState {
        self.state
    }

    /// Whether the coach is speaking
    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Messages sent to the coach, oldest first
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Lines shown to the user, oldest first
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// The stored plan once the call has ended successfully
    #[must_use]
    pub const fn plan(&self) -> Option<&GeneratedPlan> {
        self.plan.as_ref()
    }

    /// Begin a call: greet, speak, then listen.
    ///
    /// Ignored while a call is already in progress.
    #[instrument(skip(self), fields(user.id = %self.user_id))]
    pub async fn start(&mut self) {
        if matches!(
            self.state,
            CallState::Connecting | CallState::Active | CallState::Processing
        ) {
            debug!(state = ?self.state, "Call already in progress");
            return;
        }

        info!("Starting voice session");
        self.history.clear();
        self.transcript.clear();
        self.plan = None;
        self.state = CallState::Connecting;

        match self.coach.advance_turn(&[], &self.user_name).await {
            // The controller re-inserts the greeting itself, so it stays out of history
            Ok(outcome) => self.say(outcome.response).await,
            Err(e) => {
                warn!(error = %e, "Greeting failed");
                self.apologise().await;
            }
        }

        self.state = CallState::Active;
        self.voice.start();
    }

    /// End the call at the user's request
    pub fn hang_up(&mut self) {
        info!("Session ended by user");
        self.voice.stop();
        self.state = CallState::Ended;
    }

    /// React to one event from the speech adapter
    pub async fn handle_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::Transcript(text) => self.handle_transcript(text).await,
            VoiceEvent::SpeakingStarted => self.speaking = true,
            VoiceEvent::SpeakingEnded => self.speaking = false,
            VoiceEvent::ListeningStarted | VoiceEvent::ListeningStopped => {
                debug!(?event, "Listening state changed");
            }
            VoiceEvent::Error(error) if error.is_terminal() => {
                warn!(error = %error, "Speech unavailable, ending call");
                self.voice.stop();
                self.transcript.push(TranscriptEntry {
                    speaker: Speaker::Coach,
                    text: error.to_string(),
                });
                self.state = CallState::Idle;
            }
            VoiceEvent::Error(error) => {
                warn!(error = %error, "Speech error");
            }
        }
    }

    /// Start the call if needed and process events until it ends
    pub async fn run(&mut self) -> CallState {
        let mut events = self.voice.subscribe();
        if self.state == CallState::Idle {
            self.start().await;
        }

        while !matches!(self.state, CallState::Ended | CallState::Idle) {
            match events.recv().await {
                Ok(event) => self.handle_event(event).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Voice events dropped");
                }
                Err(RecvError::Closed) => {
                    warn!("Voice event channel closed");
                    self.state = CallState::Idle;
                }
            }
        }

        self.state
    }

    #[instrument(skip(self, text), fields(user.id = %self.user_id, turn.messages = self.history.len()))]
    async fn handle_transcript(&mut self, text: String) {
        if self.state != CallState::Active {
            debug!(state = ?self.state, "Ignoring transcript outside an active call");
            return;
        }

        self.voice.pause_listening();
        self.state = CallState::Processing;
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::User,
            text: text.clone(),
        });
        self.history.push(ChatMessage::user(text));

        let outcome = match self.coach.advance_turn(&self.history, &self.user_name).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Coach turn failed");
                self.apologise().await;
                self.resume();
                return;
            }
        };

        self.history.push(ChatMessage::assistant(&outcome.response));
        self.say(outcome.response).await;

        match outcome.user_data {
            Some(data) if outcome.is_complete => {
                self.voice.stop();
                match self.coach.generate_plan(&self.user_id, &data).await {
                    Ok(plan) => {
                        info!(plan.id = %plan.plan_id, "Plan generated, ending call");
                        self.plan = Some(plan);
                        self.push_coach_line(PLAN_READY);
                    }
                    Err(e) => {
                        warn!(error = %e, "Plan generation failed");
                        self.push_coach_line(GENERATION_FAILURE);
                    }
                }
                self.state = CallState::Ended;
            }
            _ => self.resume(),
        }
    }

    fn resume(&mut self) {
        self.state = CallState::Active;
        self.voice.resume_listening();
    }

    async fn say(&mut self, text: String) {
        self.voice.speak(&text).await;
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Coach,
            text,
        });
    }

    async fn apologise(&mut self) {
        self.say(TURN_APOLOGY.to_owned()).await;
    }

    fn push_coach_line(&mut self, text: &str) {
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Coach,
            text: text.to_owned(),
        });
    }
}
