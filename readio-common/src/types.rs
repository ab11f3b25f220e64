//! Track, playlist, and playback state types shared across READIO modules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A playable reference to one article.
///
/// Tracks are immutable once enqueued: the player never mutates them, it
/// only reads the content pointers when resolving the text to speak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Article UUID
    pub id: Uuid,

    /// Article title (spoken before the body)
    pub title: String,

    /// URL slug, preferred key for remote content fetch
    #[serde(default)]
    pub slug: Option<String>,

    /// Thumbnail image URL (display only, unused by the player core)
    #[serde(default)]
    pub thumbnail_url: Option<String>,

    /// Article body already embedded in the track, if the caller had it
    #[serde(default)]
    pub content: Option<String>,

    /// Short summary, used as the last resolution fallback
    #[serde(default)]
    pub summary: Option<String>,
}

impl Track {
    /// Key used for the remote content fetch: slug when present, id otherwise.
    pub fn slug_or_id(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.is_empty() => slug.clone(),
            _ => self.id.to_string(),
        }
    }
}

/// Ordered sequence of tracks plus a cursor.
///
/// The cursor is `None` when idle, otherwise a valid index into `tracks`.
/// All mutation goes through methods that preserve that invariant, so a
/// dangling cursor is unrepresentable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
}

impl Playlist {
    /// Empty playlist with no cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-track playlist with the cursor on that track.
    pub fn single(track: Track) -> Self {
        Self {
            tracks: vec![track],
            current: Some(0),
        }
    }

    /// Playlist over `tracks` starting at index 0.
    ///
    /// Returns `None` for an empty input; callers treat that as a no-op.
    pub fn from_tracks(tracks: Vec<Track>) -> Option<Self> {
        if tracks.is_empty() {
            return None;
        }
        Some(Self {
            tracks,
            current: Some(0),
        })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// True when a track after the cursor exists.
    pub fn has_next(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.tracks.len())
    }

    /// Move the cursor forward one track.
    ///
    /// Returns the new index, or `None` (cursor unchanged) when already
    /// on the last track or idle.
    pub fn advance(&mut self) -> Option<usize> {
        match self.current {
            Some(i) if i + 1 < self.tracks.len() => {
                self.current = Some(i + 1);
                self.current
            }
            _ => None,
        }
    }

    /// Move the cursor back one track.
    ///
    /// Returns the new index, or `None` (cursor unchanged) when already
    /// on the first track or idle.
    pub fn retreat(&mut self) -> Option<usize> {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                self.current
            }
            _ => None,
        }
    }

    /// Clear the cursor, keeping the tracks visible.
    ///
    /// Used when playback exhausts the queue and settles idle.
    pub fn rest(&mut self) {
        self.current = None;
    }

    /// Drop everything: tracks and cursor.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }
}

/// Playback state of the (singleton) player.
///
/// Exactly one state is active system-wide at any time. Boolean views
/// the UI consumes (`is_playing`, `is_loading_audio`) are derived from
/// this enum rather than stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Resolving,
    Synthesizing,
    Loading,
    Playing,
    Paused,
    Finished,
    Failed,
}

impl PlaybackState {
    /// Audio is currently audible.
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }

    /// A track is being prepared (resolution, synthesis, or decode).
    pub fn is_loading_audio(self) -> bool {
        matches!(
            self,
            PlaybackState::Resolving | PlaybackState::Synthesizing | PlaybackState::Loading
        )
    }

    /// An audio session exists, so pause/resume commands are meaningful.
    pub fn has_session(self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Resolving => "resolving",
            PlaybackState::Synthesizing => "synthesizing",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Finished => "finished",
            PlaybackState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}
