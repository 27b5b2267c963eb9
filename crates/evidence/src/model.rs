use extract::Claim;
use scoring::AssessmentScores;
use serde::{Deserialize, Serialize};

/// A search result kept as evidence for a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvidence {
    pub url: String,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub trust_weight: f64,
}

impl SourceEvidence {
    /// Text used for the Markdown link: the title, or the URL when there is
    /// no usable title.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAssessment {
    pub claim: Claim,
    pub support_score: f64,
    pub contradiction_score: f64,
    pub sources: Vec<SourceEvidence>,
    pub rationale: String,
}

impl AssessmentScores for ClaimAssessment {
    fn support_score(&self) -> f64 {
        self.support_score
    }

    fn contradiction_score(&self) -> f64 {
        self.contradiction_score
    }
}

/// Final output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub tldr: Vec<String>,
    pub summary: String,
    pub deep_dive: String,
    pub claims: Vec<ClaimAssessment>,
    pub truth_score: f64,
    pub star_rating: f64,
    pub sources: Vec<SourceEvidence>,
    pub markdown_report: String,
}
