// ABOUTME: Event-driven speech I/O adapter over pluggable recognizer and synthesizer backends
// ABOUTME: Keeps recognition running with auto-restart and classifies recognizer errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Voice Assistant
//!
//! Continuous recognition is not guaranteed by the underlying engine: sessions
//! end on their own after silence or network hiccups. The adapter watches each
//! session's end notice and restarts after [`RESTART_DELAY`] when the caller
//! still wants to listen.
//!
//! ## Listening state machine
//!
//! ```text
//! Idle --start/resume--> Listening{s}
//! Listening{s} --stop/pause--> Idle
//! Listening{s} --end notice--> Restarting{t} --delay--> Listening{t}
//! Restarting{t} --stop/pause--> Idle (pending restart dropped)
//! ```
//!
//! All outcomes, including errors, are delivered as [`VoiceEvent`]s on one
//! broadcast channel. Listening and speaking are independent here; callers
//! pause listening before speaking.

mod backend;
pub mod console;

pub use backend::{
    RecognizerNotice, RecognizerSettings, RecognizerSink, SpeechRecognizer, SpeechSynthesizer,
    Utterance, DEFAULT_LANG,
};

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::time;
use tracing::{debug, info, warn};

/// Delay before a spontaneously ended session is restarted
pub const RESTART_DELAY: Duration = Duration::from_millis(300);

/// Capacity of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Substrings of voice names preferred for synthesis, checked per voice
const PREFERRED_VOICE_MARKERS: [&str; 3] = ["Google", "Natural", "Samantha"];

// ============================================================================
// Events and errors
// ============================================================================

/// Speech errors surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// No recognizer available on this host
    #[error("Speech recognition is not supported here. Use a browser or host with speech recognition support.")]
    Unsupported,
    /// Microphone permission denied
    #[error("Microphone access was blocked. Allow microphone access in your settings, then try again.")]
    PermissionDenied,
    /// Microphone missing or held by another application
    #[error("Could not access your microphone. Check that it is connected, not in use by another app, and permitted for this application.")]
    DeviceUnavailable,
    /// Any other recognizer error
    #[error("Speech recognition error: {0}")]
    Recognition(String),
}

impl VoiceError {
    /// Errors that need user action and end listening
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Unsupported | Self::PermissionDenied | Self::DeviceUnavailable
        )
    }

    /// Classify a recognizer error code; `None` for expected, ignorable codes
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "no-speech" | "aborted" => None,
            "not-allowed" | "service-not-allowed" => Some(Self::PermissionDenied),
            "audio-capture" => Some(Self::DeviceUnavailable),
            other => Some(Self::Recognition(other.to_owned())),
        }
    }
}

/// Notifications emitted by the adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// A recognizer session started
    ListeningStarted,
    /// The recognizer stopped, for any reason
    ListeningStopped,
    /// An utterance started
    SpeakingStarted,
    /// An utterance finished or failed
    SpeakingEnded,
    /// A final, non-empty transcript
    Transcript(String),
    /// A surfaced error
    Error(VoiceError),
}

/// Listening sub-system state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    /// Not listening and not intending to
    Idle,
    /// Recognizer session `session` is live
    Listening {
        /// Live session number
        session: u64,
    },
    /// Waiting out the restart delay before starting session `session`
    Restarting {
        /// Session number the restart will use
        session: u64,
    },
}

/// Pick the first installed voice matching a preferred marker
#[must_use]
pub fn preferred_voice(voices: &[String]) -> Option<String> {
    voices
        .iter()
        .find(|name| PREFERRED_VOICE_MARKERS.iter().any(|m| name.contains(m)))
        .cloned()
}

// ============================================================================
// Adapter
// ============================================================================

struct Listener {
    state: ListenState,
    next_session: u64,
}

impl Listener {
    fn allocate_session(&mut self) -> u64 {
        self.next_session += 1;
        self.next_session
    }
}

struct Inner {
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    settings: RecognizerSettings,
    events: broadcast::Sender<VoiceEvent>,
    notices: mpsc::UnboundedSender<(u64, RecognizerNotice)>,
    listener: Mutex<Listener>,
}

/// Speech I/O adapter
///
/// Must be created inside a Tokio runtime; it spawns a task that consumes
/// recognizer notices.
#[derive(Clone)]
pub struct VoiceAssistant {
    inner: Arc<Inner>,
}

impl VoiceAssistant {
    /// Create an adapter over the given backends
    #[must_use]
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (notices, notice_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(Inner {
            recognizer,
            synthesizer,
            settings: RecognizerSettings::default(),
            events,
            notices,
            listener: Mutex::new(Listener {
                state: ListenState::Idle,
                next_session: 0,
            }),
        });

        tokio::spawn(pump_notices(Arc::downgrade(&inner), notice_rx));
        Self { inner }
    }

    /// Whether the recognizer backend is available
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.inner.recognizer.is_supported()
    }

    /// Subscribe to adapter events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<VoiceEvent> {
        self.inner.events.subscribe()
    }

    /// Current listening state
    #[must_use]
    pub fn state(&self) -> ListenState {
        self.inner.lock().state
    }

    /// Whether a recognizer session is live
    #[must_use]
    pub fn is_listening(&self) -> bool {
        matches!(self.state(), ListenState::Listening { .. })
    }

    /// Start listening; errors are reported as events
    pub fn start(&self) {
        info!("Voice assistant starting");
        self.inner.begin_listening();
    }

    /// Stop listening and cancel any utterance in progress
    pub fn stop(&self) {
        info!("Voice assistant stopping");
        self.inner.end_listening();
        self.inner.synthesizer.cancel();
    }

    /// Stop listening without restart, e.g. while the coach speaks
    pub fn pause_listening(&self) {
        debug!("Pausing listening");
        self.inner.end_listening();
    }

    /// Start listening again after a pause
    pub fn resume_listening(&self) {
        debug!("Resuming listening");
        self.inner.begin_listening();
    }

    /// Speak `text`, resolving when speech ends or fails.
    ///
    /// Any utterance already in progress is cancelled first.
    pub async fn speak(&self, text: &str) {
        let synthesizer = &self.inner.synthesizer;
        synthesizer.cancel();

        let utterance =
            Utterance::new(text).with_voice(preferred_voice(&synthesizer.voices()));

        self.inner.emit(VoiceEvent::SpeakingStarted);
        if let Err(e) = synthesizer.speak(&utterance).await {
            warn!(error = %e, "Speech synthesis failed");
        }
        self.inner.emit(VoiceEvent::SpeakingEnded);
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Listener> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: VoiceEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn begin_listening(&self) {
        if !self.recognizer.is_supported() {
            self.emit(VoiceEvent::Error(VoiceError::Unsupported));
            return;
        }

        let session = {
            let mut listener = self.lock();
            if listener.state != ListenState::Idle {
                return;
            }
            let session = listener.allocate_session();
            listener.state = ListenState::Listening { session };
            session
        };
        self.start_session(session);
    }

    fn end_listening(&self) {
        let previous = {
            let mut listener = self.lock();
            mem::replace(&mut listener.state, ListenState::Idle)
        };

        if let ListenState::Listening { .. } = previous {
            self.recognizer.abort();
            self.emit(VoiceEvent::ListeningStopped);
        }
    }

    fn start_session(&self, session: u64) {
        let sink = RecognizerSink::new(session, self.notices.clone());
        match self.recognizer.start(&self.settings, sink) {
            Ok(()) => {
                debug!(session, "Recognizer session started");
                self.emit(VoiceEvent::ListeningStarted);
            }
            Err(code) => {
                warn!(session, code = %code, "Recognizer failed to start");
                {
                    let mut listener = self.lock();
                    if listener.state == (ListenState::Listening { session }) {
                        listener.state = ListenState::Idle;
                    }
                }
                let error = VoiceError::from_code(&code)
                    .unwrap_or_else(|| VoiceError::Recognition(code.clone()));
                self.emit(VoiceEvent::Error(error));
            }
        }
    }

    fn is_live(&self, session: u64) -> bool {
        self.lock().state == ListenState::Listening { session }
    }

    fn handle_notice(self: &Arc<Self>, session: u64, notice: RecognizerNotice) {
        if !self.is_live(session) {
            debug!(session, ?notice, "Ignoring notice from inactive session");
            return;
        }

        match notice {
            RecognizerNotice::Result {
                transcript,
                is_final,
            } => {
                let text = transcript.trim();
                if is_final && !text.is_empty() {
                    self.emit(VoiceEvent::Transcript(text.to_owned()));
                }
            }
            RecognizerNotice::Error { code } => self.handle_error(session, &code),
            RecognizerNotice::End => self.schedule_restart(session),
        }
    }

    fn handle_error(&self, session: u64, code: &str) {
        let Some(error) = VoiceError::from_code(code) else {
            debug!(session, code, "Ignoring expected recognizer error");
            return;
        };

        if error.is_terminal() {
            let was_live = {
                let mut listener = self.lock();
                let live = listener.state == ListenState::Listening { session };
                if live {
                    listener.state = ListenState::Idle;
                }
                live
            };
            if !was_live {
                return;
            }
            self.recognizer.abort();
            warn!(session, code, "Recognizer error requires user action");
            self.emit(VoiceEvent::Error(error));
            self.emit(VoiceEvent::ListeningStopped);
        } else {
            warn!(session, code, "Recognizer error");
            self.emit(VoiceEvent::Error(error));
        }
    }

    fn schedule_restart(self: &Arc<Self>, session: u64) {
        let next = {
            let mut listener = self.lock();
            if listener.state != (ListenState::Listening { session }) {
                return;
            }
            let next = listener.allocate_session();
            listener.state = ListenState::Restarting { session: next };
            next
        };

        debug!(session, next, "Recognizer ended unexpectedly, restarting");
        self.emit(VoiceEvent::ListeningStopped);

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            time::sleep(RESTART_DELAY).await;
            if let Some(inner) = weak.upgrade() {
                inner.finish_restart(next);
            }
        });
    }

    fn finish_restart(&self, session: u64) {
        {
            let mut listener = self.lock();
            if listener.state != (ListenState::Restarting { session }) {
                debug!(session, "Restart cancelled");
                return;
            }
            listener.state = ListenState::Listening { session };
        }
        self.start_session(session);
    }
}

async fn pump_notices(
    inner: Weak<Inner>,
    mut notices: mpsc::UnboundedReceiver<(u64, RecognizerNotice)>,
) {
    while let Some((session, notice)) = notices.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_notice(session, notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(VoiceError::from_code("no-speech"), None);
        assert_eq!(VoiceError::from_code("aborted"), None);
        assert_eq!(
            VoiceError::from_code("not-allowed"),
            Some(VoiceError::PermissionDenied)
        );
        assert_eq!(
            VoiceError::from_code("audio-capture"),
            Some(VoiceError::DeviceUnavailable)
        );
        let network = VoiceError::from_code("network");
        assert_eq!(network, Some(VoiceError::Recognition("network".to_owned())));
        assert!(!network.is_some_and(|e| e.is_terminal()));
    }

    #[test]
    fn test_preferred_voice() {
        let voices = vec![
            "Alex".to_owned(),
            "Microsoft Aria Natural".to_owned(),
            "Google US English".to_owned(),
        ];
        assert_eq!(
            preferred_voice(&voices).as_deref(),
            Some("Microsoft Aria Natural")
        );
        assert_eq!(preferred_voice(&["Alex".to_owned()]), None);
    }
}
