//! # READIO Common Library
//!
//! Shared code for the READIO spoken-article player:
//! - Track and playlist types
//! - Playback state enum
//! - Event types (PlayerEvent enum) and EventBus

pub mod events;
pub mod types;

pub use events::{EventBus, PlayerEvent};
pub use types::{PlaybackState, Playlist, Track};
