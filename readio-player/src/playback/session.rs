//! Playback session — exclusive owner of the single active audio resource.
//!
//! All loads and unloads flow through one `PlaybackSession` guarded by a
//! mutex in the engine, which is what makes "at most one active
//! resource" hold structurally: a new source can only be created after
//! the previous one is released, on the same owner, under the same lock.

use crate::audio::sink::AudioSink;
use crate::error::Result;
use crate::speech::AudioPayload;
use std::sync::Arc;
use tracing::debug;

/// Wraps the platform audio slot and tracks whether a resource exists.
pub struct PlaybackSession {
    sink: Arc<dyn AudioSink>,
    loaded: bool,
}

impl PlaybackSession {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            loaded: false,
        }
    }

    /// True while an audio resource exists (playing, paused, or finished).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Release any current resource, then create and start a new one.
    pub fn load(&mut self, payload: AudioPayload) -> Result<()> {
        self.unload();
        self.sink.load(payload)?;
        self.loaded = true;
        Ok(())
    }

    /// Pause the current resource. No-op without one.
    pub fn pause(&self) {
        if self.loaded {
            self.sink.pause();
        }
    }

    /// Resume the current resource. No-op without one.
    pub fn resume(&self) {
        if self.loaded {
            self.sink.resume();
        }
    }

    /// Position in the current track as a fraction in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.loaded {
            self.sink.progress()
        } else {
            0.0
        }
    }

    /// True once the current resource has played to its natural end.
    pub fn is_finished(&self) -> bool {
        self.loaded && self.sink.is_finished()
    }

    /// Unconditional teardown, safe from every state.
    ///
    /// Mid-resolution no resource exists yet and this is a no-op.
    pub fn unload(&mut self) {
        if self.loaded {
            debug!("Releasing audio resource");
            self.sink.stop();
            self.loaded = false;
        }
    }
}
