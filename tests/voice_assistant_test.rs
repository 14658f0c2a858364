// ABOUTME: Integration tests for the speech I/O adapter state machine
// ABOUTME: Covers transcripts, automatic restart, terminal errors, stale sessions, and speech
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use fitvoice_server::voice::{ListenState, VoiceAssistant, VoiceError, VoiceEvent, RESTART_DELAY};
use helpers::speech::{FakeRecognizer, FakeSynthesizer};
use tokio::sync::broadcast::Receiver;
use tokio::time::{self, timeout};

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    voice: VoiceAssistant,
    recognizer: Arc<FakeRecognizer>,
    synthesizer: Arc<FakeSynthesizer>,
    events: Receiver<VoiceEvent>,
}

fn harness_with(recognizer: FakeRecognizer, synthesizer: FakeSynthesizer) -> Harness {
    let recognizer = Arc::new(recognizer);
    let synthesizer = Arc::new(synthesizer);
    let voice = VoiceAssistant::new(recognizer.clone(), synthesizer.clone());
    let events = voice.subscribe();
    Harness {
        voice,
        recognizer,
        synthesizer,
        events,
    }
}

fn harness() -> Harness {
    harness_with(FakeRecognizer::new(), FakeSynthesizer::new())
}

async fn next_event(events: &mut Receiver<VoiceEvent>) -> VoiceEvent {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for voice event")
        .unwrap()
}

async fn assert_quiet(events: &mut Receiver<VoiceEvent>) {
    if let Ok(event) = timeout(Duration::from_secs(2), events.recv()).await {
        panic!("unexpected voice event: {event:?}");
    }
}

// ============================================================================
// Listening
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_start_and_final_transcript() {
    let mut h = harness();

    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);
    assert!(h.voice.is_listening());

    h.recognizer.say_interim("I'm");
    h.recognizer.say("  I'm 28  ");
    assert_eq!(
        next_event(&mut h.events).await,
        VoiceEvent::Transcript("I'm 28".to_owned())
    );

    h.recognizer.say("   ");
    assert_quiet(&mut h.events).await;
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_is_noop() {
    let mut h = harness();

    h.voice.start();
    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);
    assert_quiet(&mut h.events).await;
    assert_eq!(h.recognizer.start_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_spontaneous_end_restarts_after_delay() {
    let mut h = harness();
    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);

    h.recognizer.end();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStopped);
    assert!(matches!(h.voice.state(), ListenState::Restarting { .. }));
    assert_eq!(h.recognizer.start_count(), 1);

    time::sleep(RESTART_DELAY + Duration::from_millis(10)).await;
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);
    assert_eq!(h.recognizer.start_count(), 2);
    assert!(h.voice.is_listening());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_restart_cancels_it() {
    let mut h = harness();
    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);

    h.recognizer.end();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStopped);

    h.voice.stop();
    time::sleep(RESTART_DELAY * 3).await;

    assert_eq!(h.voice.state(), ListenState::Idle);
    assert_eq!(h.recognizer.start_count(), 1);
    assert_quiet(&mut h.events).await;
}

#[tokio::test(start_paused = true)]
async fn test_expected_errors_are_silent() {
    let mut h = harness();
    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);

    h.recognizer.error("no-speech");
    h.recognizer.error("aborted");
    assert_quiet(&mut h.events).await;
    assert!(h.voice.is_listening());
}

#[tokio::test(start_paused = true)]
async fn test_transient_error_keeps_listening() {
    let mut h = harness();
    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);

    h.recognizer.error("network");
    assert_eq!(
        next_event(&mut h.events).await,
        VoiceEvent::Error(VoiceError::Recognition("network".to_owned()))
    );
    assert!(h.voice.is_listening());
}

// ============================================================================
// Terminal errors
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_audio_capture_stops_without_restart() {
    let mut h = harness();
    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);

    h.recognizer.error("audio-capture");
    h.recognizer.end();

    assert_eq!(
        next_event(&mut h.events).await,
        VoiceEvent::Error(VoiceError::DeviceUnavailable)
    );
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStopped);

    time::sleep(RESTART_DELAY * 3).await;
    assert_quiet(&mut h.events).await;
    assert_eq!(h.voice.state(), ListenState::Idle);
    assert_eq!(h.recognizer.start_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_permission_denied_at_start() {
    let mut h = harness();
    h.recognizer.fail_starts_with("not-allowed");

    h.voice.start();
    assert_eq!(
        next_event(&mut h.events).await,
        VoiceEvent::Error(VoiceError::PermissionDenied)
    );
    assert_eq!(h.voice.state(), ListenState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_host() {
    let mut h = harness_with(FakeRecognizer::unsupported(), FakeSynthesizer::new());

    assert!(!h.voice.is_supported());
    h.voice.start();
    let event = next_event(&mut h.events).await;
    assert_eq!(event, VoiceEvent::Error(VoiceError::Unsupported));
    if let VoiceEvent::Error(error) = event {
        assert!(error.is_terminal());
    }
    assert_eq!(h.recognizer.start_count(), 0);
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_notices_from_old_session_are_ignored() {
    let mut h = harness();
    h.voice.start();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);
    let old_sink = h.recognizer.last_sink();

    h.voice.pause_listening();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStopped);
    h.voice.resume_listening();
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::ListeningStarted);

    old_sink.result("late words", true);
    old_sink.end();
    assert_quiet(&mut h.events).await;
    assert!(h.voice.is_listening());

    h.recognizer.say("fresh words");
    assert_eq!(
        next_event(&mut h.events).await,
        VoiceEvent::Transcript("fresh words".to_owned())
    );
}

// ============================================================================
// Speech
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_speak_emits_events_and_prefers_voice() {
    let mut h = harness_with(
        FakeRecognizer::new(),
        FakeSynthesizer::with_voices(&["Alex", "Google US English"]),
    );

    h.voice.speak("How tall are you?").await;

    assert_eq!(next_event(&mut h.events).await, VoiceEvent::SpeakingStarted);
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::SpeakingEnded);

    let utterances = h.synthesizer.utterances();
    assert_eq!(utterances.len(), 1);
    assert_eq!(utterances[0].text, "How tall are you?");
    assert_eq!(utterances[0].voice.as_deref(), Some("Google US English"));
    assert_eq!(utterances[0].lang, "en-US");
    assert!(h.synthesizer.cancel_count() >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_speech_still_ends() {
    let mut h = harness_with(FakeRecognizer::new(), FakeSynthesizer::failing());

    h.voice.speak("Hello").await;

    assert_eq!(next_event(&mut h.events).await, VoiceEvent::SpeakingStarted);
    assert_eq!(next_event(&mut h.events).await, VoiceEvent::SpeakingEnded);
}
