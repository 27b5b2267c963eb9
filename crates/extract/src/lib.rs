pub mod llm;
pub mod parse;
pub mod prompt;
pub mod schema;

pub use llm::ChatClient;
pub use schema::{AssessmentVerdict, Claim};

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Produces the raw three-section summary (TL;DR, Executive Summary, Deep
/// Dive) of a piece of content.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str) -> Result<String>;
}

/// Pulls at most `k` checkable claims out of a piece of content.
#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    async fn extract(&self, content: &str, k: usize) -> Result<Vec<Claim>>;
}

/// Judges one claim against search snippets.
#[async_trait]
pub trait ClaimAssessor: Send + Sync {
    async fn assess(&self, claim: &str, snippets: &[String]) -> Result<AssessmentVerdict>;
}

/// LLM-backed implementation of all three text collaborators.
#[derive(Clone)]
pub struct LlmAnalyst {
    llm_client: ChatClient,
    json_attempts: usize,
}

impl LlmAnalyst {
    pub fn new(llm_client: ChatClient) -> Self {
        Self {
            llm_client,
            json_attempts: 2,
        }
    }
}

#[async_trait]
impl Summarizer for LlmAnalyst {
    async fn summarize(&self, content: &str) -> Result<String> {
        let prompt = prompt::build_summary_prompt(content);

        self.llm_client
            .complete(&prompt)
            .await
            .context("Failed to summarize content")
    }
}

#[async_trait]
impl ClaimExtractor for LlmAnalyst {
    async fn extract(&self, content: &str, k: usize) -> Result<Vec<Claim>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let prompt = prompt::build_claims_prompt(content, k);

        let claims = self.llm_client
            .complete_json_with_retry(&prompt, self.json_attempts, |reply| {
                parse::parse_claims(reply, k)
            })
            .await
            .context("Failed to extract claims")?;
        tracing::debug!(claims = claims.len(), "Extracted claims");

        Ok(claims)
    }
}

#[async_trait]
impl ClaimAssessor for LlmAnalyst {
    async fn assess(&self, claim: &str, snippets: &[String]) -> Result<AssessmentVerdict> {
        let prompt = prompt::build_assessment_prompt(claim, snippets);

        // Single call: the evidence pipeline substitutes a neutral verdict
        // instead of retrying.
        let reply = self.llm_client
            .complete(&prompt)
            .await
            .context("Failed to assess claim")?;

        parse::parse_verdict(&reply)
    }
}
