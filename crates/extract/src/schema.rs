use serde::{Deserialize, Serialize};

/// A factual assertion pulled out of the analyzed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub proposed_queries: Vec<String>,
}

impl Claim {
    /// Build a claim, falling back to the claim text itself as the only
    /// search query when none are proposed.
    pub fn new(text: impl Into<String>, snippet: Option<String>, proposed_queries: Vec<String>) -> Self {
        let text = text.into();
        let mut proposed_queries: Vec<String> = proposed_queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if proposed_queries.is_empty() {
            proposed_queries.push(text.clone());
        }

        Self {
            text,
            snippet: snippet.filter(|s| !s.trim().is_empty()),
            proposed_queries,
        }
    }
}

/// Verdict of the claim assessor. Scores are always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentVerdict {
    pub support_score: f64,
    pub contradiction_score: f64,
    pub rationale: String,
}

impl AssessmentVerdict {
    pub const PARSE_ERROR: &'static str = "Parse error";

    /// Neutral verdict substituted when the assessor could not be used.
    pub fn parse_error() -> Self {
        Self {
            support_score: 0.0,
            contradiction_score: 0.0,
            rationale: Self::PARSE_ERROR.to_string(),
        }
    }
}
