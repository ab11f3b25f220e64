//! Content resolution
//!
//! Produces the plain text to be spoken for a track, trying in order:
//! text embedded on the track, a remote fetch by slug (id when the slug
//! is absent), then the track's summary. Output is stripped of markup,
//! whitespace-normalized, and truncated to a configured length so
//! synthesis requests stay reasonably sized.

use crate::error::{Error, Result};
use async_trait::async_trait;
use readio_common::types::Track;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of spoken text for a track.
///
/// Seam for the playback engine; the HTTP implementation below is the
/// production one, tests substitute scripted fakes.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Resolve the text to speak for `track`.
    ///
    /// Errors mean every source failed; the caller skips the track.
    async fn resolve(&self, track: &Track) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    text: String,
}

/// Resolves article text against the remote content backend.
pub struct HttpContentResolver {
    client: reqwest::Client,
    base_url: String,
    max_chars: usize,
}

impl HttpContentResolver {
    pub fn new(base_url: String, max_chars: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            max_chars,
        })
    }

    async fn fetch_remote(&self, track: &Track) -> Result<String> {
        let url = format!("{}/content/{}", self.base_url, track.slug_or_id());
        debug!("Fetching article text: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Resolution(format!("content fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Resolution(format!(
                "content fetch returned {}",
                response.status()
            )));
        }

        let body: ContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Resolution(format!("invalid content response: {}", e)))?;

        Ok(body.text)
    }
}

#[async_trait]
impl ContentSource for HttpContentResolver {
    async fn resolve(&self, track: &Track) -> Result<String> {
        // 1. Text already embedded on the track
        if let Some(content) = &track.content {
            let text = sanitize(content, self.max_chars);
            if !text.is_empty() {
                return Ok(text);
            }
        }

        // 2. Remote fetch by slug (or id when no slug exists)
        match self.fetch_remote(track).await {
            Ok(raw) => {
                let text = sanitize(&raw, self.max_chars);
                if !text.is_empty() {
                    return Ok(text);
                }
                warn!("Remote content for {} is empty after sanitizing", track.id);
            }
            Err(e) => {
                warn!("Remote content fetch for {} failed: {}", track.id, e);
            }
        }

        // 3. Summary fallback
        if let Some(summary) = &track.summary {
            let text = sanitize(summary, self.max_chars);
            if !text.is_empty() {
                return Ok(text);
            }
        }

        Err(Error::Resolution(format!(
            "no text source available for track {}",
            track.id
        )))
    }
}

/// Strip markup, normalize whitespace, and truncate to `max_chars`.
pub fn sanitize(raw: &str, max_chars: usize) -> String {
    let stripped = strip_markup(raw);
    let normalized = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&normalized, max_chars)
}

/// Remove HTML-style tags and decode the handful of entities the CMS emits.
fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // Tag boundaries act as word separators so "<p>a</p><p>b</p>"
                // does not fuse into "ab"
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
