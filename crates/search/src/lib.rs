pub mod tavily;

pub use tavily::TavilyClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One web search result. Providers do not always return a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: Option<String>,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Run `query`, returning at most `max_results` hits.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}
