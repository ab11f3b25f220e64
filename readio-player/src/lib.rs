//! # READIO Player Library (readio-player)
//!
//! Spoken-article playback service: resolves an article's text through a
//! fallback chain, requests synthesized speech from a remote endpoint,
//! and plays the returned audio through a single owned sink with
//! auto-advance through an in-memory queue.
//!
//! **Architecture:** one `PlayerEngine` instance owns the playback
//! session (and through it the one platform audio resource), publishes
//! state via `SharedState`, and is driven over an HTTP + SSE boundary.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod playback;
pub mod resolver;
pub mod speech;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use playback::{PlaybackSession, PlayerEngine};
pub use state::SharedState;
