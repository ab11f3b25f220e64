//! Shared playback state
//!
//! Thread-safe shared state observed by the HTTP layer and mutated only
//! by the playback engine. UI layers read snapshots and subscribe to
//! events; they never touch the audio resource itself.

use readio_common::events::{EventBus, PlayerEvent};
use readio_common::types::{PlaybackState, Playlist, Track};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

/// Read-only snapshot published to UI layers.
///
/// The boolean views are derived from the tagged state, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub is_playing: bool,
    pub is_loading_audio: bool,
    pub current_track: Option<Track>,
    pub playlist: Vec<Track>,
    pub current_index: Option<usize>,
    /// Position within the current track, in [0, 1]
    pub progress: f32,
}

/// Shared state accessible by all components.
///
/// Uses RwLock for concurrent read access with rare writes.
pub struct SharedState {
    playback_state: RwLock<PlaybackState>,
    playlist: RwLock<Playlist>,
    progress: RwLock<f32>,
    events: EventBus,
}

impl SharedState {
    pub fn new(event_bus_capacity: usize) -> Self {
        Self {
            playback_state: RwLock::new(PlaybackState::Idle),
            playlist: RwLock::new(Playlist::new()),
            progress: RwLock::new(0.0),
            events: EventBus::new(event_bus_capacity),
        }
    }

    /// Broadcast an event to all listeners (no receivers is OK).
    pub fn broadcast_event(&self, event: PlayerEvent) {
        self.events.emit_lossy(event);
    }

    /// Subscribe to the event stream (SSE, tests).
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub async fn playback_state(&self) -> PlaybackState {
        *self.playback_state.read().await
    }

    /// Set playback state, returning the previous one.
    pub async fn set_playback_state(&self, state: PlaybackState) -> PlaybackState {
        let mut guard = self.playback_state.write().await;
        std::mem::replace(&mut *guard, state)
    }

    pub async fn progress(&self) -> f32 {
        *self.progress.read().await
    }

    pub async fn set_progress(&self, progress: f32) {
        *self.progress.write().await = progress.clamp(0.0, 1.0);
    }

    pub async fn playlist(&self) -> Playlist {
        self.playlist.read().await.clone()
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.playlist.read().await.current_track().cloned()
    }

    /// Run `f` against the playlist under the write lock.
    pub async fn with_playlist<R>(&self, f: impl FnOnce(&mut Playlist) -> R) -> R {
        let mut guard = self.playlist.write().await;
        f(&mut guard)
    }

    /// Published snapshot for the UI contract.
    pub async fn snapshot(&self) -> PlayerSnapshot {
        let state = *self.playback_state.read().await;
        let playlist = self.playlist.read().await;
        PlayerSnapshot {
            state,
            is_playing: state.is_playing(),
            is_loading_audio: state.is_loading_audio(),
            current_track: playlist.current_track().cloned(),
            playlist: playlist.tracks().to_vec(),
            current_index: playlist.current_index(),
            progress: *self.progress.read().await,
        }
    }
}
