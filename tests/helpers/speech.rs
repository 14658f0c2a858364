// ABOUTME: Fake speech recognizer and synthesizer driven directly by tests
// ABOUTME: Lets tests push transcripts, errors, and end notices into the voice adapter

use std::sync::Mutex;

use async_trait::async_trait;
use fitvoice_server::voice::{
    RecognizerSettings, RecognizerSink, SpeechRecognizer, SpeechSynthesizer, Utterance,
};

/// Recognizer whose sessions are fed by the test
pub struct FakeRecognizer {
    supported: bool,
    start_error: Mutex<Option<String>>,
    sink: Mutex<Option<RecognizerSink>>,
    starts: Mutex<usize>,
    aborts: Mutex<usize>,
}

impl FakeRecognizer {
    pub fn new() -> Self {
        Self {
            supported: true,
            start_error: Mutex::new(None),
            sink: Mutex::new(None),
            starts: Mutex::new(0),
            aborts: Mutex::new(0),
        }
    }

    /// A host without speech recognition
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Make every subsequent start fail with `code`
    pub fn fail_starts_with(&self, code: &str) {
        *self.start_error.lock().unwrap() = Some(code.to_owned());
    }

    fn live_sink(&self) -> RecognizerSink {
        self.sink
            .lock()
            .unwrap()
            .clone()
            .expect("recognizer was never started")
    }

    /// Deliver a final transcript to the current session
    pub fn say(&self, text: &str) {
        self.live_sink().result(text, true);
    }

    /// Deliver an interim transcript to the current session
    pub fn say_interim(&self, text: &str) {
        self.live_sink().result(text, false);
    }

    /// Deliver an error code to the current session
    pub fn error(&self, code: &str) {
        self.live_sink().error(code);
    }

    /// End the current session as if the engine stopped on its own
    pub fn end(&self) {
        self.live_sink().end();
    }

    /// Sink of the most recent session
    pub fn last_sink(&self) -> RecognizerSink {
        self.live_sink()
    }

    pub fn start_count(&self) -> usize {
        *self.starts.lock().unwrap()
    }

    pub fn abort_count(&self) -> usize {
        *self.aborts.lock().unwrap()
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&self, _settings: &RecognizerSettings, sink: RecognizerSink) -> Result<(), String> {
        *self.starts.lock().unwrap() += 1;
        if let Some(code) = self.start_error.lock().unwrap().clone() {
            return Err(code);
        }
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn abort(&self) {
        *self.aborts.lock().unwrap() += 1;
    }
}

/// Synthesizer that records what it was asked to say
#[derive(Default)]
pub struct FakeSynthesizer {
    voices: Vec<String>,
    spoken: Mutex<Vec<Utterance>>,
    cancels: Mutex<usize>,
    fail: bool,
}

impl FakeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(voices: &[&str]) -> Self {
        Self {
            voices: voices.iter().map(|v| (*v).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// A synthesizer whose every utterance fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.text.clone())
            .collect()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock().unwrap()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    fn voices(&self) -> Vec<String> {
        self.voices.clone()
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), String> {
        self.spoken.lock().unwrap().push(utterance.clone());
        if self.fail {
            Err("synthesis-failed".to_owned())
        } else {
            Ok(())
        }
    }
}
