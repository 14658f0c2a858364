// ABOUTME: Speech backend traits for continuous recognition and synthesis
// ABOUTME: Recognizer sessions report results, errors, and end notices through a session-tagged sink
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Recognition language
pub const DEFAULT_LANG: &str = "en-US";

/// Settings applied to every recognizer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerSettings {
    /// Keep listening across pauses in speech
    pub continuous: bool,
    /// Deliver interim hypotheses as well as final results
    pub interim_results: bool,
    /// BCP 47 language tag
    pub lang: String,
    /// Alternatives per result
    pub max_alternatives: u32,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: false,
            lang: DEFAULT_LANG.to_owned(),
            max_alternatives: 1,
        }
    }
}

/// What a recognizer session reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerNotice {
    /// A recognition result
    Result {
        /// Recognized text
        transcript: String,
        /// Whether the result is final
        is_final: bool,
    },
    /// A recognizer error code such as `no-speech` or `not-allowed`
    Error {
        /// Error code
        code: String,
    },
    /// The session ended, intentionally or not
    End,
}

/// Channel end handed to a recognizer session
///
/// Every notice carries the session number so notices from a session that
/// was already aborted can be told apart from the live one.
#[derive(Debug, Clone)]
pub struct RecognizerSink {
    session: u64,
    tx: mpsc::UnboundedSender<(u64, RecognizerNotice)>,
}

impl RecognizerSink {
    pub(crate) const fn new(session: u64, tx: mpsc::UnboundedSender<(u64, RecognizerNotice)>) -> Self {
        Self { session, tx }
    }

    /// Session number this sink belongs to
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Report a recognition result
    pub fn result(&self, transcript: impl Into<String>, is_final: bool) {
        self.send(RecognizerNotice::Result {
            transcript: transcript.into(),
            is_final,
        });
    }

    /// Report an error code
    pub fn error(&self, code: impl Into<String>) {
        self.send(RecognizerNotice::Error { code: code.into() });
    }

    /// Report the end of the session
    pub fn end(&self) {
        self.send(RecognizerNotice::End);
    }

    fn send(&self, notice: RecognizerNotice) {
        // Adapter gone; nothing left to notify
        let _ = self.tx.send((self.session, notice));
    }
}

/// Continuous speech-to-text engine
pub trait SpeechRecognizer: Send + Sync {
    /// Whether recognition is available on this host
    fn is_supported(&self) -> bool;

    /// Begin a recognition session reporting to `sink`
    ///
    /// # Errors
    ///
    /// Returns a recognizer error code when the session cannot start
    fn start(&self, settings: &RecognizerSettings, sink: RecognizerSink) -> Result<(), String>;

    /// Abort the current session without further notices being acted on
    fn abort(&self);
}

/// Text to be spoken with its voice parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text to speak
    pub text: String,
    /// Speaking rate
    pub rate: f32,
    /// Voice pitch
    pub pitch: f32,
    /// Output volume
    pub volume: f32,
    /// BCP 47 language tag
    pub lang: String,
    /// Selected voice name, if any
    pub voice: Option<String>,
}

impl Utterance {
    /// Utterance with default rate, pitch, volume and language
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            lang: DEFAULT_LANG.to_owned(),
            voice: None,
        }
    }

    /// Use the named voice
    #[must_use]
    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.voice = voice;
        self
    }
}

/// Text-to-speech engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Names of the installed voices
    fn voices(&self) -> Vec<String>;

    /// Stop any utterance in progress
    fn cancel(&self);

    /// Speak and resolve when the utterance ends
    ///
    /// # Errors
    ///
    /// Returns a description of the synthesis failure
    async fn speak(&self, utterance: &Utterance) -> Result<(), String>;
}
