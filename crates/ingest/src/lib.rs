pub mod youtube;

pub use youtube::{YouTubeTranscripts, video_id};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    pub text: String,
    pub start_seconds: f64,
}

/// Plain transcript text plus the timed segments it was joined from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<TimedSegment>,
}

impl Transcript {
    pub fn from_segments(segments: Vec<TimedSegment>) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self { text, segments }
    }
}

/// Fetches the transcript of a video. `None` means no public transcript is
/// available, which callers handle by asking for other input.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(&self, video_url: &str) -> Option<Transcript>;
}
