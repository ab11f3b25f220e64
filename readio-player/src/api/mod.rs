//! HTTP API for the READIO player
//!
//! REST control endpoints plus an SSE event stream. UI layers only ever
//! observe snapshots and issue commands through this surface; the audio
//! resource itself is never exposed.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{router, run, AppContext};
