//! Remote speech synthesis
//!
//! One POST per utterance; the backend answers with a base64-encoded
//! audio payload. A failed request is fatal for that track — the engine
//! skips it rather than retrying.

use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Opaque synthesized audio, ready to hand to the platform decoder.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Vec<u8>,
}

/// Source of synthesized speech.
///
/// Seam for the playback engine; tests substitute scripted fakes.
#[async_trait]
pub trait SpeechSource: Send + Sync {
    /// Synthesize `text` into a playable audio payload.
    async fn synthesize(&self, text: &str) -> Result<AudioPayload>;
}

#[derive(Debug, Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeakResponse {
    audio: String,
}

/// Client for the remote `/speak` synthesis endpoint.
pub struct HttpSpeechClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpeechClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl SpeechSource for HttpSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        let url = format!("{}/speak", self.base_url);
        debug!("Requesting synthesis of {} chars", text.chars().count());

        let response = self
            .client
            .post(&url)
            .json(&SpeakRequest { text })
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("speak request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Synthesis(format!(
                "speak endpoint returned {}",
                response.status()
            )));
        }

        let body: SpeakResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(format!("invalid speak response: {}", e)))?;

        let data = general_purpose::STANDARD
            .decode(body.audio.as_bytes())
            .map_err(|e| Error::Synthesis(format!("invalid base64 audio payload: {}", e)))?;

        if data.is_empty() {
            return Err(Error::Synthesis("empty audio payload".into()));
        }

        debug!("Received {} byte audio payload", data.len());
        Ok(AudioPayload { data })
    }
}

/// Compose the utterance sent to synthesis: title, then resolved body.
pub fn compose_utterance(title: &str, body: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        body.to_string()
    } else {
        format!("{}. {}", title.trim_end_matches('.'), body)
    }
}
