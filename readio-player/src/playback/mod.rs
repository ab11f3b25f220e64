//! Playback engine and session management

pub mod engine;
pub mod session;

pub use engine::PlayerEngine;
pub use session::PlaybackSession;
