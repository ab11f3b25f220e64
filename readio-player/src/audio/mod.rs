//! Platform audio capability
//!
//! The player treats "turn a byte payload into audible output with
//! play/pause/position/completion signals" as a platform capability
//! behind the [`AudioSink`] trait. The rodio-backed implementation
//! lives in `output`.

pub mod output;
pub mod sink;

pub use output::RodioSink;
pub use sink::AudioSink;
