//! Audio sink trait — the seam between the playback session and the
//! platform's audio output path.

use crate::error::Result;
use crate::speech::AudioPayload;

/// One audio output slot.
///
/// Implementations hold at most one decoded source at a time. `load`
/// replaces whatever was playing and starts the new source immediately
/// (autoplay). All methods must be safe to call in any order; `stop`,
/// `pause`, and `resume` are no-ops when nothing is loaded.
pub trait AudioSink: Send + Sync {
    /// Decode `payload` and start playing it, releasing any prior source
    /// first. Fails when the payload is not a playable audio stream.
    fn load(&self, payload: AudioPayload) -> Result<()>;

    fn pause(&self);

    fn resume(&self);

    /// Release the current source. Idempotent.
    fn stop(&self);

    /// Position within the current source as a fraction in [0, 1].
    ///
    /// Returns 0.0 when nothing is loaded.
    fn progress(&self) -> f32;

    /// True once the loaded source has played to completion.
    fn is_finished(&self) -> bool;
}
