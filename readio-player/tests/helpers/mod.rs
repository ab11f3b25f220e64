//! Shared test infrastructure: scripted fakes for the content, speech,
//! and audio seams, plus polling helpers for asynchronous assertions.
//!
//! The speech fake encodes the utterance text into the payload bytes,
//! so tests can tell exactly which track's audio reached the sink.

#![allow(dead_code)]

use async_trait::async_trait;
use readio_common::types::{PlaybackState, Track};
use readio_player::audio::sink::AudioSink;
use readio_player::error::{Error, Result};
use readio_player::playback::{PlaybackSession, PlayerEngine};
use readio_player::resolver::ContentSource;
use readio_player::speech::{AudioPayload, SpeechSource};
use readio_player::state::SharedState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Track builders
// ============================================================================

pub fn track(title: &str) -> Track {
    Track {
        id: Uuid::new_v4(),
        title: title.to_string(),
        slug: Some(title.to_lowercase().replace(' ', "-")),
        thumbnail_url: None,
        content: None,
        summary: None,
    }
}

// ============================================================================
// Content fake
// ============================================================================

#[derive(Clone)]
pub struct ContentScript {
    pub delay: Duration,
    pub fail: bool,
}

impl Default for ContentScript {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: false,
        }
    }
}

/// Scripted `ContentSource`: resolves "Body of {title}" unless told to
/// delay or fail for a given track.
pub struct FakeContent {
    scripts: Mutex<HashMap<Uuid, ContentScript>>,
    pub calls: AtomicUsize,
}

impl FakeContent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn script(&self, track: &Track, script: ContentScript) {
        self.scripts.lock().unwrap().insert(track.id, script);
    }

    pub fn fail_for(&self, track: &Track) {
        self.script(
            track,
            ContentScript {
                fail: true,
                ..Default::default()
            },
        );
    }

    pub fn delay_for(&self, track: &Track, delay: Duration) {
        self.script(
            track,
            ContentScript {
                delay,
                ..Default::default()
            },
        );
    }
}

#[async_trait]
impl ContentSource for FakeContent {
    async fn resolve(&self, track: &Track) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&track.id)
            .cloned()
            .unwrap_or_default();

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        if script.fail {
            return Err(Error::Resolution(format!("no text for {}", track.title)));
        }
        Ok(format!("Body of {}", track.title))
    }
}

// ============================================================================
// Speech fake
// ============================================================================

#[derive(Clone)]
pub struct SpeechScript {
    pub delay: Duration,
    pub fail: bool,
}

impl Default for SpeechScript {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: false,
        }
    }
}

/// Scripted `SpeechSource`: the payload bytes are the utterance itself.
///
/// Scripts are keyed by a substring of the utterance (normally the track
/// title), so per-track delays and failures compose naturally.
pub struct FakeSpeech {
    scripts: Mutex<Vec<(String, SpeechScript)>>,
    pub utterances: Mutex<Vec<String>>,
}

impl FakeSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(Vec::new()),
            utterances: Mutex::new(Vec::new()),
        })
    }

    pub fn script(&self, utterance_contains: &str, script: SpeechScript) {
        self.scripts
            .lock()
            .unwrap()
            .push((utterance_contains.to_string(), script));
    }

    pub fn fail_for(&self, utterance_contains: &str) {
        self.script(
            utterance_contains,
            SpeechScript {
                fail: true,
                ..Default::default()
            },
        );
    }

    pub fn delay_for(&self, utterance_contains: &str, delay: Duration) {
        self.script(
            utterance_contains,
            SpeechScript {
                delay,
                ..Default::default()
            },
        );
    }

    pub fn synthesized(&self) -> Vec<String> {
        self.utterances.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSource for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, s)| s.clone())
            .unwrap_or_default();

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        if script.fail {
            return Err(Error::Synthesis(format!(
                "synthesis refused for utterance: {}",
                text
            )));
        }

        self.utterances.lock().unwrap().push(text.to_string());
        Ok(AudioPayload {
            data: text.as_bytes().to_vec(),
        })
    }
}

// ============================================================================
// Audio fake
// ============================================================================

#[derive(Default)]
struct FakeAudioInner {
    live: bool,
    paused: bool,
    finished: bool,
    progress: f32,
    loads: Vec<Vec<u8>>,
    stops: usize,
    pauses: usize,
    resumes: usize,
}

/// In-memory `AudioSink` that records every lifecycle call and lets the
/// test drive completion and position.
///
/// `overlap_detected` trips if a second source is ever created while one
/// is still live — the "at most one active resource" property.
pub struct FakeAudio {
    inner: Mutex<FakeAudioInner>,
    pub overlap_detected: AtomicBool,
}

impl FakeAudio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(FakeAudioInner::default()),
            overlap_detected: AtomicBool::new(false),
        })
    }

    /// Simulate the platform's natural-completion signal.
    pub fn finish_current(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.live {
            inner.finished = true;
            inner.progress = 1.0;
        }
    }

    pub fn set_position(&self, progress: f32) {
        self.inner.lock().unwrap().progress = progress;
    }

    pub fn loaded_payloads(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .loads
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    pub fn is_live(&self) -> bool {
        self.inner.lock().unwrap().live
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    pub fn stop_count(&self) -> usize {
        self.inner.lock().unwrap().stops
    }

    pub fn pause_count(&self) -> usize {
        self.inner.lock().unwrap().pauses
    }

    pub fn resume_count(&self) -> usize {
        self.inner.lock().unwrap().resumes
    }
}

impl AudioSink for FakeAudio {
    fn load(&self, payload: AudioPayload) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.live {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }
        inner.live = true;
        inner.paused = false;
        inner.finished = false;
        inner.progress = 0.0;
        inner.loads.push(payload.data);
        Ok(())
    }

    fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.paused = true;
        inner.pauses += 1;
    }

    fn resume(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.paused = false;
        inner.resumes += 1;
    }

    fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.live = false;
        inner.finished = false;
        inner.stops += 1;
    }

    fn progress(&self) -> f32 {
        self.inner.lock().unwrap().progress
    }

    fn is_finished(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.live && inner.finished
    }
}

// ============================================================================
// Engine harness
// ============================================================================

pub struct Harness {
    pub state: Arc<SharedState>,
    pub engine: Arc<PlayerEngine>,
    pub content: Arc<FakeContent>,
    pub speech: Arc<FakeSpeech>,
    pub audio: Arc<FakeAudio>,
}

pub fn harness() -> Harness {
    let state = Arc::new(SharedState::new(64));
    let content = FakeContent::new();
    let speech = FakeSpeech::new();
    let audio = FakeAudio::new();

    let engine = Arc::new(PlayerEngine::new(
        Arc::clone(&state),
        content.clone() as Arc<dyn ContentSource>,
        speech.clone() as Arc<dyn SpeechSource>,
        PlaybackSession::new(audio.clone() as Arc<dyn AudioSink>),
        Duration::from_millis(5),
    ));

    Harness {
        state,
        engine,
        content,
        speech,
        audio,
    }
}

// ============================================================================
// Async assertion helpers
// ============================================================================

/// Poll until `predicate` returns true or the timeout expires.
pub async fn wait_until<F>(mut predicate: F, what: &str)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if predicate() {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for: {}", what);
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Poll an asynchronous predicate until it returns true or the timeout
/// expires. The closure must return an owned future (clone Arcs in).
pub async fn wait_until_async<F, Fut>(mut predicate: F, what: &str)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if predicate().await {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for: {}", what);
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Poll until the player reaches `expected`.
pub async fn wait_for_state(state: &SharedState, expected: PlaybackState) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let current = state.playback_state().await;
        if current == expected {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!(
                "timed out waiting for state {:?}, still {:?}",
                expected, current
            );
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
