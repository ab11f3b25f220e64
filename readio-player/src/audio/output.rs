//! Rodio-backed audio output
//!
//! Wraps a `rodio::Sink` created per loaded payload. The `OutputStream`
//! itself is owned by `main` (it is tied to the audio device and must
//! outlive every sink); this type only keeps the cloneable handle.

use crate::audio::sink::AudioSink;
use crate::error::{Error, Result};
use crate::speech::AudioPayload;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

struct ActiveSource {
    sink: Sink,
    duration: Option<Duration>,
}

/// Audio output slot backed by the system's default device.
pub struct RodioSink {
    handle: OutputStreamHandle,
    active: Mutex<Option<ActiveSource>>,
}

impl RodioSink {
    /// Open the default output device.
    ///
    /// The returned `OutputStream` must be kept alive as long as audio
    /// should play; dropping it silences every sink created from it.
    pub fn open_default() -> Result<(OutputStream, Self)> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| Error::AudioOutput(format!("cannot open output device: {}", e)))?;
        Ok((stream, Self::new(handle)))
    }

    pub fn new(handle: OutputStreamHandle) -> Self {
        Self {
            handle,
            active: Mutex::new(None),
        }
    }
}

impl AudioSink for RodioSink {
    fn load(&self, payload: AudioPayload) -> Result<()> {
        let mut active = self.active.lock().expect("audio sink lock poisoned");

        // Old source must be fully released before the new one exists,
        // otherwise two sources compete for the output device.
        if let Some(old) = active.take() {
            old.sink.stop();
        }

        let source = Decoder::new(Cursor::new(payload.data))
            .map_err(|e| Error::Load(format!("payload is not decodable audio: {}", e)))?;
        let duration = source.total_duration();

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| Error::AudioOutput(format!("cannot create sink: {}", e)))?;
        sink.append(source);
        sink.play();

        debug!(
            "Loaded audio source, duration {:?}",
            duration.map(|d| d.as_secs_f32())
        );
        *active = Some(ActiveSource { sink, duration });
        Ok(())
    }

    fn pause(&self) {
        if let Some(active) = self.active.lock().expect("audio sink lock poisoned").as_ref() {
            active.sink.pause();
        }
    }

    fn resume(&self) {
        if let Some(active) = self.active.lock().expect("audio sink lock poisoned").as_ref() {
            active.sink.play();
        }
    }

    fn stop(&self) {
        if let Some(active) = self.active.lock().expect("audio sink lock poisoned").take() {
            active.sink.stop();
        }
    }

    fn progress(&self) -> f32 {
        let guard = self.active.lock().expect("audio sink lock poisoned");
        match guard.as_ref() {
            Some(active) => {
                if active.sink.empty() {
                    return 1.0;
                }
                match active.duration {
                    Some(total) if !total.is_zero() => {
                        (active.sink.get_pos().as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
                    }
                    // Unknown duration (some compressed streams); position
                    // cannot be expressed as a fraction until completion
                    _ => 0.0,
                }
            }
            None => 0.0,
        }
    }

    fn is_finished(&self) -> bool {
        self.active
            .lock()
            .expect("audio sink lock poisoned")
            .as_ref()
            .map(|active| active.sink.empty())
            .unwrap_or(false)
    }
}
