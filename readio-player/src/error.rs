//! Error types for readio-player
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.
//!
//! Per-track failures (`Resolution`, `Synthesis`, `Load`) never escape
//! the player's public surface: the engine logs them, emits a
//! `TrackFailed` event, and skips to the next track.

use thiserror::Error;

/// Main error type for readio-player
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// All text sources for a track failed
    #[error("Content resolution error: {0}")]
    Resolution(String),

    /// Remote speech synthesis failed
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Platform failed to create a playable resource from the payload
    #[error("Audio load error: {0}")]
    Load(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short label for the failure stage, used in `TrackFailed` events.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Resolution(_) => "resolution",
            Error::Synthesis(_) => "synthesis",
            Error::Load(_) | Error::AudioOutput(_) => "load",
            _ => "internal",
        }
    }
}

/// Convenience Result type using readio-player Error
pub type Result<T> = std::result::Result<T, Error>;
