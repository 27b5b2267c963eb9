use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

use crate::{SearchHit, WebSearch};

#[derive(Clone)]
pub struct TavilyClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build search HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let Some(api_key) = self.api_key.as_deref() else {
            anyhow::bail!("No search provider configured. Set TAVILY_API_KEY.");
        };

        let url = format!("{}/search", self.base_url);

        let body = json!({
            "api_key": api_key,
            "query": query,
            "max_results": max_results,
        });

        let response = self.client.post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send search request to Tavily")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Tavily search failed: {} {}", status, error_text);
        }

        let result: Value = response.json().await
            .context("Failed to parse Tavily response")?;

        let mut hits = parse_results(&result);
        hits.truncate(max_results);

        tracing::debug!(query, hits = hits.len(), "Search completed");

        Ok(hits)
    }
}

/// Map Tavily's `results[].{url, title, content}` to search hits. A missing
/// `results` array means no hits.
fn parse_results(result: &Value) -> Vec<SearchHit> {
    let Some(items) = result["results"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| SearchHit {
            url: non_empty(&item["url"]),
            title: non_empty(&item["title"]),
            snippet: non_empty(&item["content"]),
        })
        .collect()
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
