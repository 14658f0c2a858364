// ABOUTME: Terminal speech backends reading transcripts from stdin and speaking to stdout
// ABOUTME: Used by the fitvoice-session binary where no microphone or speaker is wired up

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use super::backend::{RecognizerSettings, RecognizerSink, SpeechRecognizer, SpeechSynthesizer, Utterance};

/// Error code reported when stdin closes; ends listening like a lost microphone
const INPUT_CLOSED_CODE: &str = "audio-capture";

/// Treats each stdin line as a final transcript
///
/// One reader task is spawned on first start and lives for the process.
/// Lines typed while no session is active are dropped.
#[derive(Default)]
pub struct ConsoleRecognizer {
    active: Arc<Mutex<Option<RecognizerSink>>>,
    reader_started: Mutex<bool>,
}

impl ConsoleRecognizer {
    /// Create a console recognizer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_reader(&self) {
        let mut started = self
            .reader_started
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *started {
            return;
        }
        *started = true;

        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            let mut lines = BufReader::new(io::stdin()).lines();
            loop {
                let line = lines.next_line().await;
                let sink = active.lock().unwrap_or_else(PoisonError::into_inner).clone();
                match (line, sink) {
                    (Ok(Some(text)), Some(sink)) => sink.result(text, true),
                    (Ok(Some(_)), None) => debug!("Dropping input typed while not listening"),
                    (Ok(None) | Err(_), sink) => {
                        if let Some(sink) = sink {
                            sink.error(INPUT_CLOSED_CODE);
                        }
                        break;
                    }
                }
            }
        });
    }
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&self, _settings: &RecognizerSettings, sink: RecognizerSink) -> Result<(), String> {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
        self.ensure_reader();
        Ok(())
    }

    fn abort(&self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Prints utterances to stdout prefixed with a speaker label
pub struct ConsoleSynthesizer {
    speaker: String,
}

impl ConsoleSynthesizer {
    /// Create a synthesizer printing as `speaker`
    #[must_use]
    pub fn new(speaker: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ConsoleSynthesizer {
    fn voices(&self) -> Vec<String> {
        Vec::new()
    }

    fn cancel(&self) {}

    async fn speak(&self, utterance: &Utterance) -> Result<(), String> {
        let mut stdout = io::stdout();
        let line = format!("{}: {}\n", self.speaker, utterance.text);
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| e.to_string())?;
        stdout.flush().await.map_err(|e| e.to_string())
    }
}
