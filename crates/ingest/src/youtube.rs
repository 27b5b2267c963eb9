use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::{TimedSegment, Transcript, TranscriptFetcher};

static WATCH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v=([A-Za-z0-9_-]{11})").expect("valid regex"));

static SHORT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtu\.be/([A-Za-z0-9_-]{11})").expect("valid regex"));

static CAPTION_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<text\b[^>]*?\bstart="([0-9.]+)"[^>]*>(.*?)</text>"#).expect("valid regex")
});

/// Extract the 11-character video id from a watch URL or a youtu.be link.
pub fn video_id(url: &str) -> Option<String> {
    WATCH_ID
        .captures(url)
        .or_else(|| SHORT_ID.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Public English caption track fetcher.
#[derive(Clone)]
pub struct YouTubeTranscripts {
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeTranscripts {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build transcript HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn download(&self, id: &str) -> Result<String> {
        let url = format!("{}/api/timedtext", self.base_url);

        let response = self.client
            .get(&url)
            .query(&[("lang", "en"), ("v", id)])
            .send()
            .await
            .context("Failed to request caption track")?;

        if !response.status().is_success() {
            anyhow::bail!("Caption request failed: {}", response.status());
        }

        response.text().await.context("Failed to read caption track")
    }
}

#[async_trait]
impl TranscriptFetcher for YouTubeTranscripts {
    async fn fetch(&self, video_url: &str) -> Option<Transcript> {
        let Some(id) = video_id(video_url) else {
            tracing::info!(url = video_url, "No video id in URL");
            return None;
        };

        let xml = match self.download(&id).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::info!(video_id = %id, error = %e, "No transcript via caption track");
                return None;
            }
        };

        let segments = parse_caption_track(&xml);
        if segments.is_empty() {
            tracing::info!(video_id = %id, "Caption track is empty");
            return None;
        }

        Some(Transcript::from_segments(segments))
    }
}

/// Parse `<text start=".." dur="..">..</text>` nodes of a timedtext
/// document. Segments with no text are skipped.
pub fn parse_caption_track(xml: &str) -> Vec<TimedSegment> {
    CAPTION_NODE
        .captures_iter(xml)
        .filter_map(|caps| {
            let start_seconds = caps[1].parse::<f64>().ok()?;
            let text = unescape_html(&caps[2])
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            (!text.is_empty()).then_some(TimedSegment { text, start_seconds })
        })
        .collect()
}

// Caption tracks are often escaped twice ("&amp;#39;"), so `&amp;` goes first.
fn unescape_html(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
}
