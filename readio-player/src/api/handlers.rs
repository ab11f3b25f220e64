//! HTTP request handlers
//!
//! Commands always return 200 with a small status body: per the error
//! design, no per-track failure escapes the player as an HTTP error.
//! Failures surface as `TrackFailed` events and state transitions.

use crate::api::server::AppContext;
use crate::state::PlayerSnapshot;
use axum::{extract::State, Json};
use readio_common::types::Track;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub track: Track,
}

#[derive(Debug, Deserialize)]
pub struct PlayQueueRequest {
    pub tracks: Vec<Track>,
}

fn accepted() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "accepted".to_string(),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "readio_player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /playback/state - Published snapshot of the player
pub async fn get_state(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    Json(ctx.state.snapshot().await)
}

/// POST /playback/play - Play a single track
pub async fn play(
    State(ctx): State<AppContext>,
    Json(req): Json<PlayRequest>,
) -> Json<StatusResponse> {
    ctx.engine.play_track(req.track).await;
    accepted()
}

/// POST /playback/play-queue - Replace the queue and play from the start
///
/// An empty track list is accepted and ignored.
pub async fn play_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<PlayQueueRequest>,
) -> Json<StatusResponse> {
    ctx.engine.play_queue(req.tracks).await;
    accepted()
}

/// POST /playback/pause
pub async fn pause(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.pause().await;
    accepted()
}

/// POST /playback/resume
pub async fn resume(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.resume().await;
    accepted()
}

/// POST /playback/next
pub async fn next(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.next().await;
    accepted()
}

/// POST /playback/previous
pub async fn previous(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.prev().await;
    accepted()
}

/// POST /playback/close
pub async fn close(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.close().await;
    accepted()
}
