//! Playback engine orchestration
//!
//! Drives the resolve → synthesize → load → play pipeline for the
//! current track, serializes every track change through a session
//! token, and auto-advances through the queue.
//!
//! # Ordering model
//!
//! There is no cancellation of in-flight network requests. Instead,
//! every command that changes the active track bumps the engine's
//! session token, and every asynchronous continuation carries the token
//! it was started with. A continuation whose token no longer matches
//! the engine's is stale and discards its result.
//!
//! Token checks alone are not enough: a command could land between a
//! continuation's check and the writes that follow it. The command gate
//! closes that window — commands, completion/failure continuations, and
//! the pipeline's load step all run under one mutex, and the token is
//! only ever bumped while holding it. A token verified under the gate
//! therefore stays current for the rest of the critical section.

use crate::error::{Error, Result};
use crate::playback::session::PlaybackSession;
use crate::resolver::ContentSource;
use crate::speech::{compose_utterance, SpeechSource};
use crate::state::SharedState;
use futures::future::BoxFuture;
use readio_common::events::PlayerEvent;
use readio_common::types::{PlaybackState, Playlist, Track};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Outcome of a `next()` command against the playlist.
enum NextOutcome {
    Advanced,
    EndOfQueue,
    Noop,
}

/// Playback engine — the queue manager and sole driver of the state
/// machine.
///
/// One instance exists per process; it owns the session (and through it
/// the single platform audio resource) and publishes all observable
/// state through [`SharedState`].
pub struct PlayerEngine {
    state: Arc<SharedState>,
    session: Arc<Mutex<PlaybackSession>>,
    resolver: Arc<dyn ContentSource>,
    speech: Arc<dyn SpeechSource>,
    /// Serializes commands and continuations. Every token bump happens
    /// while holding this lock.
    gate: Arc<Mutex<()>>,
    /// Monotonic session token; incremented whenever the active track
    /// changes. The stale-result detector across await points.
    token: Arc<AtomicU64>,
    poll_interval: Duration,
}

impl Clone for PlayerEngine {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            session: Arc::clone(&self.session),
            resolver: Arc::clone(&self.resolver),
            speech: Arc::clone(&self.speech),
            gate: Arc::clone(&self.gate),
            token: Arc::clone(&self.token),
            poll_interval: self.poll_interval,
        }
    }
}

impl PlayerEngine {
    pub fn new(
        state: Arc<SharedState>,
        resolver: Arc<dyn ContentSource>,
        speech: Arc<dyn SpeechSource>,
        session: PlaybackSession,
        poll_interval: Duration,
    ) -> Self {
        Self {
            state,
            session: Arc::new(Mutex::new(session)),
            resolver,
            speech,
            gate: Arc::new(Mutex::new(())),
            token: Arc::new(AtomicU64::new(0)),
            poll_interval,
        }
    }

    // ------------------------------------------------------------------
    // Command API
    // ------------------------------------------------------------------

    /// Replace the queue with a single track and start playing it.
    pub async fn play_track(&self, track: Track) {
        let _guard = self.gate.lock().await;
        info!("Play command: {}", track.title);
        self.state
            .with_playlist(|pl| *pl = Playlist::single(track))
            .await;
        self.emit_queue_changed().await;
        self.begin_current().await;
    }

    /// Replace the queue with `tracks` and start at index 0.
    ///
    /// An empty input is a silent no-op.
    pub async fn play_queue(&self, tracks: Vec<Track>) {
        let Some(playlist) = Playlist::from_tracks(tracks) else {
            debug!("Ignoring play_queue with empty track list");
            return;
        };
        let _guard = self.gate.lock().await;
        info!("Play queue command: {} tracks", playlist.len());
        self.state.with_playlist(|pl| *pl = playlist).await;
        self.emit_queue_changed().await;
        self.begin_current().await;
    }

    /// Pause playback. No-op unless currently playing.
    pub async fn pause(&self) {
        let _guard = self.gate.lock().await;
        if self.state.playback_state().await != PlaybackState::Playing {
            return;
        }
        self.session.lock().await.pause();
        self.transition(PlaybackState::Paused).await;
    }

    /// Resume playback. No-op unless currently paused.
    pub async fn resume(&self) {
        let _guard = self.gate.lock().await;
        if self.state.playback_state().await != PlaybackState::Paused {
            return;
        }
        self.session.lock().await.resume();
        self.transition(PlaybackState::Playing).await;
    }

    /// Skip to the next track, or finish the queue when on the last one.
    pub async fn next(&self) {
        let _guard = self.gate.lock().await;
        let outcome = self
            .state
            .with_playlist(|pl| {
                if pl.advance().is_some() {
                    NextOutcome::Advanced
                } else if pl.current_index().is_some() {
                    NextOutcome::EndOfQueue
                } else {
                    NextOutcome::Noop
                }
            })
            .await;

        match outcome {
            NextOutcome::Advanced => {
                self.emit_queue_changed().await;
                self.begin_current().await;
            }
            NextOutcome::EndOfQueue => {
                self.transition(PlaybackState::Finished).await;
                self.settle_idle().await;
            }
            NextOutcome::Noop => {}
        }
    }

    /// Return to the previous track. No-op on the first track or idle.
    pub async fn prev(&self) {
        let _guard = self.gate.lock().await;
        let retreated = self.state.with_playlist(|pl| pl.retreat()).await;
        if retreated.is_some() {
            self.emit_queue_changed().await;
            self.begin_current().await;
        }
    }

    /// Tear everything down: release audio, clear the queue, settle idle.
    ///
    /// Always safe, including when already idle or mid-resolution.
    pub async fn close(&self) {
        let _guard = self.gate.lock().await;
        info!("Close command");
        self.bump_token();
        self.session.lock().await.unload();
        self.state.with_playlist(|pl| pl.clear()).await;
        self.state.set_progress(0.0).await;
        self.transition(PlaybackState::Idle).await;
        self.emit_queue_changed().await;
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    /// Begin the resolve pipeline for the playlist's current track.
    ///
    /// Bumps the session token (invalidating any in-flight work for the
    /// previous track), releases the old audio resource, resets
    /// progress, and spawns the asynchronous pipeline. Caller must hold
    /// the gate.
    ///
    /// Boxed because the failure and completion continuations recurse
    /// back into it; the indirection keeps the future type finite.
    fn begin_current(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let token = self.bump_token();
            self.session.lock().await.unload();
            self.state.set_progress(0.0).await;

            let Some(track) = self.state.current_track().await else {
                self.transition(PlaybackState::Idle).await;
                return;
            };

            self.transition(PlaybackState::Resolving).await;

            let engine = self.clone();
            tokio::spawn(async move {
                engine.run_pipeline(token, track).await;
            });
        })
    }

    async fn run_pipeline(&self, token: u64, track: Track) {
        if let Err(e) = self.prepare_and_play(token, &track).await {
            let _guard = self.gate.lock().await;
            self.skip_failed(token, &track, e).await;
        }
    }

    /// Resolve, synthesize, and load the track.
    ///
    /// Returns `Ok(false)` when a newer command superseded this pipeline
    /// at any await point; the result is then discarded without touching
    /// shared state.
    async fn prepare_and_play(&self, token: u64, track: &Track) -> Result<bool> {
        let text = self.resolver.resolve(track).await?;
        if !self.is_current(token) {
            debug!("Discarding stale resolution for {}", track.id);
            return Ok(false);
        }

        self.transition_guarded(token, PlaybackState::Synthesizing)
            .await;
        let utterance = compose_utterance(&track.title, &text);
        let payload = self.speech.synthesize(&utterance).await?;

        // The slow work is done; everything from here to the monitor
        // spawn applies atomically with respect to commands.
        let _guard = self.gate.lock().await;
        if !self.is_current(token) {
            debug!("Discarding stale payload for {}", track.id);
            return Ok(false);
        }

        self.transition(PlaybackState::Loading).await;
        self.session.lock().await.load(payload)?;
        self.transition(PlaybackState::Playing).await;

        self.state.broadcast_event(PlayerEvent::TrackStarted {
            track_id: track.id,
            title: track.title.clone(),
            timestamp: chrono::Utc::now(),
        });

        let engine = self.clone();
        let track = track.clone();
        tokio::spawn(async move {
            engine.monitor(token, track).await;
        });

        Ok(true)
    }

    /// Poll progress and watch for natural completion.
    ///
    /// One monitor task exists per session token. Each tick takes the
    /// gate before acting, so a tick either runs entirely before a
    /// superseding command or observes the bumped token and exits.
    async fn monitor(&self, token: u64, track: Track) {
        let mut tick = interval(self.poll_interval);
        loop {
            tick.tick().await;

            let _guard = self.gate.lock().await;
            if !self.is_current(token) {
                return;
            }

            let (progress, finished) = {
                let session = self.session.lock().await;
                (session.progress(), session.is_finished())
            };

            if finished {
                self.handle_finished(&track).await;
                return;
            }

            // No progress updates while paused
            if self.state.playback_state().await != PlaybackState::Playing {
                continue;
            }

            self.state.set_progress(progress).await;
            self.state.broadcast_event(PlayerEvent::PlaybackProgress {
                track_id: track.id,
                progress,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Natural completion: advance to the next track or settle idle.
    ///
    /// Caller holds the gate with the track's token verified current.
    async fn handle_finished(&self, track: &Track) {
        info!("Track finished: {}", track.title);

        self.state.broadcast_event(PlayerEvent::TrackCompleted {
            track_id: track.id,
            completed: true,
            timestamp: chrono::Utc::now(),
        });
        self.transition(PlaybackState::Finished).await;

        let advanced = self.state.with_playlist(|pl| pl.advance()).await;
        if advanced.is_some() {
            self.emit_queue_changed().await;
            self.begin_current().await;
        } else {
            self.settle_idle().await;
        }
    }

    /// A track failed to resolve, synthesize, or load: log, publish, and
    /// skip forward. The queue itself survives per-track failures.
    ///
    /// Caller holds the gate.
    async fn skip_failed(&self, token: u64, track: &Track, error: Error) {
        if !self.is_current(token) {
            debug!("Discarding stale failure for {}: {}", track.id, error);
            return;
        }
        warn!(
            "Track {} failed during {}: {}",
            track.id,
            error.stage(),
            error
        );

        self.state.broadcast_event(PlayerEvent::TrackFailed {
            track_id: track.id,
            reason: error.to_string(),
            timestamp: chrono::Utc::now(),
        });
        self.transition(PlaybackState::Failed).await;

        let advanced = self.state.with_playlist(|pl| pl.advance()).await;
        if advanced.is_some() {
            self.emit_queue_changed().await;
            self.begin_current().await;
        } else {
            debug!("Queue exhausted with no playable track, settling idle");
            self.settle_idle().await;
        }
    }

    /// Stop at the end of the queue: release the resource, clear the
    /// cursor (tracks stay visible), reset progress, publish `Idle`.
    ///
    /// Caller holds the gate.
    async fn settle_idle(&self) {
        self.bump_token();
        self.session.lock().await.unload();
        self.state.with_playlist(|pl| pl.rest()).await;
        self.state.set_progress(0.0).await;
        self.transition(PlaybackState::Idle).await;
        self.emit_queue_changed().await;
    }

    // ------------------------------------------------------------------
    // Token and state helpers
    // ------------------------------------------------------------------

    fn bump_token(&self) -> u64 {
        self.token.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        self.token.load(Ordering::SeqCst) == token
    }

    /// Unconditional state transition, published when it changes anything.
    async fn transition(&self, new_state: PlaybackState) {
        let old_state = self.state.set_playback_state(new_state).await;
        if old_state != new_state {
            self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                old_state,
                new_state,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// State transition applied under the gate, only while `token` is
    /// still current. Returns whether the transition was applied.
    async fn transition_guarded(&self, token: u64, new_state: PlaybackState) -> bool {
        let _guard = self.gate.lock().await;
        if !self.is_current(token) {
            return false;
        }
        self.transition(new_state).await;
        true
    }

    async fn emit_queue_changed(&self) {
        let playlist = self.state.playlist().await;
        self.state.broadcast_event(PlayerEvent::QueueChanged {
            queue: playlist.tracks().iter().map(|t| t.id).collect(),
            current_index: playlist.current_index(),
            timestamp: chrono::Utc::now(),
        });
    }
}
