//! READIO Player - Main entry point
//!
//! Wires configuration, tracing, the playback engine, and the HTTP
//! control surface, then serves until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use readio_player::api::{self, AppContext};
use readio_player::audio::RodioSink;
use readio_player::config::Config;
use readio_player::playback::{PlaybackSession, PlayerEngine};
use readio_player::resolver::HttpContentResolver;
use readio_player::speech::HttpSpeechClient;
use readio_player::state::SharedState;

/// Command-line arguments for readio-player
#[derive(Parser, Debug)]
#[command(name = "readio-player")]
#[command(about = "Spoken-article playback service for READIO")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "READIO_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "READIO_PORT")]
    port: Option<u16>,

    /// Content/synthesis backend base URL (overrides config)
    #[arg(short, long, env = "READIO_BACKEND_URL")]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).context("Failed to load configuration")?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(url) = args.backend_url {
        config.backend_url = url;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("readio_player={}", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting READIO player on port {}", config.port);
    info!("Backend: {}", config.backend_url);

    // Platform audio: the OutputStream must outlive every sink, so it
    // stays owned by main for the whole process lifetime.
    let (_output_stream, sink) =
        RodioSink::open_default().context("Failed to open audio output device")?;

    let resolver = HttpContentResolver::new(
        config.backend_url.clone(),
        config.max_utterance_chars,
        config.request_timeout(),
    )
    .context("Failed to build content resolver")?;
    let speech = HttpSpeechClient::new(config.backend_url.clone(), config.request_timeout())
        .context("Failed to build speech client")?;

    let state = Arc::new(SharedState::new(config.event_bus_capacity));
    let engine = Arc::new(PlayerEngine::new(
        Arc::clone(&state),
        Arc::new(resolver),
        Arc::new(speech),
        PlaybackSession::new(Arc::new(sink)),
        config.progress_poll_interval(),
    ));

    let ctx = AppContext { state, engine };

    api::run(config.port, ctx, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
