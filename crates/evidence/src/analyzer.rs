use extract::{ClaimExtractor, Summarizer};
use scoring::{aggregate_truth_score, star_rating_from_quality};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::AnalysisResult;
use crate::pipeline::{EvidencePipeline, PipelineTrace};
use crate::report::ReportComposer;
use crate::sections::split_sections;

/// Default claim budget handed to the extractor.
pub const DEFAULT_MAX_CLAIMS: usize = 8;

// Star rating proxy: the LLM is not asked for clarity or bias, so both are
// fixed and evidence follows the truth score.
const CLARITY: f64 = 0.8;
const BIAS: f64 = 0.3;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No content provided.")]
    EmptyContent,

    #[error("Summarization failed: {0:#}")]
    Summarization(anyhow::Error),
}

/// A finished analysis plus diagnostics from the evidence pipeline.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub trace: PipelineTrace,
    pub extraction_failed: bool,
}

pub struct Analyzer {
    summarizer: Arc<dyn Summarizer>,
    extractor: Arc<dyn ClaimExtractor>,
    pipeline: EvidencePipeline,
    composer: ReportComposer,
    max_claims: usize,
}

impl Analyzer {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        extractor: Arc<dyn ClaimExtractor>,
        pipeline: EvidencePipeline,
    ) -> Self {
        Self {
            summarizer,
            extractor,
            pipeline,
            composer: ReportComposer::default(),
            max_claims: DEFAULT_MAX_CLAIMS,
        }
    }

    pub fn with_max_claims(mut self, max_claims: usize) -> Self {
        self.max_claims = max_claims;
        self
    }

    /// Run the whole flow on `content`. Only empty input and a failed
    /// summary abort; claim extraction failure means zero claims.
    pub async fn analyze(&self, content: &str) -> Result<Analysis, AnalysisError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AnalysisError::EmptyContent);
        }

        let raw_summary = self.summarizer
            .summarize(content)
            .await
            .map_err(AnalysisError::Summarization)?;

        let (claims, extraction_failed) = match self.extractor.extract(content, self.max_claims).await {
            Ok(mut claims) => {
                claims.truncate(self.max_claims);
                (claims, false)
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Claim extraction failed, continuing with no claims");
                (Vec::new(), true)
            }
        };

        let run = self.pipeline.run(&claims).await;

        let truth_score = aggregate_truth_score(&run.assessments);
        let star_rating = star_rating_from_quality(CLARITY, (truth_score / 100.0).min(1.0), BIAS);

        let result = self.composer.compose(
            split_sections(&raw_summary),
            run.assessments,
            truth_score,
            star_rating,
        );

        info!(
            claims = result.claims.len(),
            sources = result.sources.len(),
            truth_score,
            star_rating,
            "Analysis complete"
        );

        Ok(Analysis {
            result,
            trace: run.trace,
            extraction_failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use extract::{AssessmentVerdict, Claim, ClaimAssessor};
    use search::{SearchHit, WebSearch};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SUMMARY: &str = "TL;DR:\n- Two claims checked\n- Mixed evidence\n\nExecutive Summary:\nA short text.\n\nDeep Dive:\nNothing fancy.";

    struct FixedSummarizer(Option<&'static str>);

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn summarize(&self, _content: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("No OPENAI_API_KEY set"))
        }
    }

    struct FixedClaims {
        claims: Option<Vec<Claim>>,
        requested_k: AtomicUsize,
    }

    impl FixedClaims {
        fn new(claims: Option<Vec<Claim>>) -> Self {
            Self {
                claims,
                requested_k: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ClaimExtractor for FixedClaims {
        async fn extract(&self, _content: &str, k: usize) -> Result<Vec<Claim>> {
            self.requested_k.store(k, Ordering::SeqCst);
            self.claims.clone().ok_or_else(|| anyhow::anyhow!("bad JSON"))
        }
    }

    /// `.gov` result for the first claim's query, an unknown domain for the
    /// second.
    struct DomainSearch;

    #[async_trait]
    impl WebSearch for DomainSearch {
        async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            let url = match query {
                "vaccine schedule" => "https://www.cdc.gov/vaccines",
                _ => "https://random-blog.example/post",
            };
            Ok(vec![SearchHit {
                url: Some(url.to_string()),
                title: Some("Result".to_string()),
                snippet: Some("text".to_string()),
            }])
        }
    }

    struct ScriptedAssessor;

    #[async_trait]
    impl ClaimAssessor for ScriptedAssessor {
        async fn assess(&self, claim: &str, _snippets: &[String]) -> Result<AssessmentVerdict> {
            let (support, contradiction) = if claim.starts_with("Vaccines") {
                (0.8, 0.1)
            } else {
                (0.2, 0.6)
            };
            Ok(AssessmentVerdict {
                support_score: support,
                contradiction_score: contradiction,
                rationale: "scripted".to_string(),
            })
        }
    }

    fn analyzer(summary: Option<&'static str>, claims: Option<Vec<Claim>>) -> (Analyzer, Arc<FixedClaims>) {
        let extractor = Arc::new(FixedClaims::new(claims));
        let pipeline = EvidencePipeline::new(Arc::new(DomainSearch), Arc::new(ScriptedAssessor));
        let analyzer = Analyzer::new(Arc::new(FixedSummarizer(summary)), extractor.clone(), pipeline);
        (analyzer, extractor)
    }

    #[tokio::test]
    async fn test_two_claim_scenario() {
        let claims = vec![
            Claim::new("Vaccines are scheduled by the CDC", None, vec!["vaccine schedule".to_string()]),
            Claim::new("The moon landing was staged", None, vec![]),
        ];
        let (analyzer, extractor) = analyzer(Some(SUMMARY), Some(claims));

        let analysis = analyzer.analyze("  some content  ").await.unwrap();
        let result = &analysis.result;

        assert_eq!(extractor.requested_k.load(Ordering::SeqCst), DEFAULT_MAX_CLAIMS);
        assert_eq!(result.claims.len(), 2);
        assert_eq!(result.claims[0].sources[0].trust_weight, 1.0);
        assert_eq!(result.claims[1].sources[0].trust_weight, 0.6);
        assert_eq!(result.truth_score, 37.5);
        // evidence 0.375 -> base 0.5275 -> 3.11
        assert_eq!(result.star_rating, 3.1);
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.tldr, vec!["Two claims checked", "Mixed evidence"]);
        assert_eq!(result.summary, "A short text.");
        assert_eq!(result.deep_dive, "Nothing fancy.");
        assert!(result.markdown_report.contains("**Truth Score:** 37.5/100"));
        assert!(!analysis.extraction_failed);
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let (analyzer, _) = analyzer(Some(SUMMARY), Some(vec![]));
        let err = analyzer.analyze(" \n\t ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyContent));
    }

    #[tokio::test]
    async fn test_summarizer_failure_is_fatal() {
        let (analyzer, _) = analyzer(None, Some(vec![]));
        let err = analyzer.analyze("text").await.unwrap_err();

        assert!(matches!(err, AnalysisError::Summarization(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_extraction_failure_means_no_claims() {
        let (analyzer, _) = analyzer(Some(SUMMARY), None);
        let analysis = analyzer.analyze("text").await.unwrap();

        assert!(analysis.extraction_failed);
        assert!(analysis.result.claims.is_empty());
        assert_eq!(analysis.result.truth_score, 50.0);
        // evidence 0.5 -> base 0.59 -> 3.36
        assert_eq!(analysis.result.star_rating, 3.4);
        assert!(analysis.result.markdown_report.contains("_No claims extracted._"));
    }

    #[tokio::test]
    async fn test_claims_truncated_to_budget() {
        let claims = (0..5)
            .map(|i| Claim::new(format!("claim {i}"), None, vec![]))
            .collect();
        let (analyzer, extractor) = analyzer(Some(SUMMARY), Some(claims));
        let analyzer = analyzer.with_max_claims(2);

        let analysis = analyzer.analyze("text").await.unwrap();

        assert_eq!(extractor.requested_k.load(Ordering::SeqCst), 2);
        assert_eq!(analysis.result.claims.len(), 2);
    }

    #[test]
    fn test_result_serializes_with_snake_case_fields() {
        let result = AnalysisResult {
            tldr: vec![],
            summary: String::new(),
            deep_dive: String::new(),
            claims: vec![],
            truth_score: 50.0,
            star_rating: 3.4,
            sources: vec![],
            markdown_report: String::new(),
        };
        let json = serde_json::to_value(&result).unwrap();

        for key in ["tldr", "summary", "deep_dive", "claims", "truth_score", "star_rating", "sources", "markdown_report"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
