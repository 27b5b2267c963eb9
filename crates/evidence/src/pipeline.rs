use extract::{AssessmentVerdict, Claim, ClaimAssessor};
use scoring::TrustWeightTable;
use search::{SearchHit, WebSearch};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::attempt::Attempt;
use crate::model::{ClaimAssessment, SourceEvidence};
use crate::retry::RetryPolicy;

/// Fan-out and truncation caps applied per claim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineLimits {
    pub queries_per_claim: usize,
    pub results_per_query: usize,
    pub sources_per_claim: usize,
    pub snippets_per_assessment: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            queries_per_claim: 3,
            results_per_query: 3,
            sources_per_claim: 5,
            snippets_per_assessment: 8,
        }
    }
}

/// Diagnostics for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineTrace {
    pub claims_processed: usize,
    pub queries_issued: usize,
    pub search_failures: usize,
    pub assessment_failures: usize,
}

#[derive(Debug, Clone)]
pub struct EvidenceRun {
    pub assessments: Vec<ClaimAssessment>,
    /// Every claim's sources in claim order, duplicates included.
    pub sources: Vec<SourceEvidence>,
    pub trace: PipelineTrace,
}

/// Gathers and weighs evidence for each claim: search, trust weighting,
/// then one assessment call.
pub struct EvidencePipeline {
    search: Arc<dyn WebSearch>,
    assessor: Arc<dyn ClaimAssessor>,
    trust: TrustWeightTable,
    limits: PipelineLimits,
    search_retry: RetryPolicy,
}

impl EvidencePipeline {
    pub fn new(search: Arc<dyn WebSearch>, assessor: Arc<dyn ClaimAssessor>) -> Self {
        Self {
            search,
            assessor,
            trust: TrustWeightTable::default(),
            limits: PipelineLimits::default(),
            search_retry: RetryPolicy::single_attempt(),
        }
    }

    pub fn with_limits(mut self, limits: PipelineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_trust_table(mut self, trust: TrustWeightTable) -> Self {
        self.trust = trust;
        self
    }

    pub fn with_search_retry(mut self, policy: RetryPolicy) -> Self {
        self.search_retry = policy;
        self
    }

    /// Process claims sequentially, in order. Collaborator failures never
    /// abort the run.
    pub async fn run(&self, claims: &[Claim]) -> EvidenceRun {
        let mut trace = PipelineTrace::default();
        let mut assessments = Vec::with_capacity(claims.len());
        let mut sources = Vec::new();

        for claim in claims {
            let assessment = self.assess_claim(claim, &mut trace).await;
            sources.extend(assessment.sources.iter().cloned());
            assessments.push(assessment);
            trace.claims_processed += 1;
        }

        debug!(
            claims = trace.claims_processed,
            queries = trace.queries_issued,
            search_failures = trace.search_failures,
            assessment_failures = trace.assessment_failures,
            "Evidence pipeline finished"
        );

        EvidenceRun {
            assessments,
            sources,
            trace,
        }
    }

    async fn assess_claim(&self, claim: &Claim, trace: &mut PipelineTrace) -> ClaimAssessment {
        let queries = resolve_queries(claim);

        // Step 1-2: search fan-out
        let mut hits = Vec::new();
        for query in queries.iter().take(self.limits.queries_per_claim) {
            trace.queries_issued += 1;

            match self.search_query(query).await {
                Attempt::Succeeded(found) => hits.extend(found),
                Attempt::Failed { reason } => {
                    trace.search_failures += 1;
                    warn!(claim = %claim.text, query = %query, error = %reason, "Search failed, continuing without results");
                }
            }
        }

        // Step 3: weigh sources
        let mut sources = Vec::new();
        let mut snippets = Vec::new();
        for hit in hits.into_iter().take(self.limits.sources_per_claim) {
            let Some(url) = hit.url.filter(|u| !u.trim().is_empty()) else {
                continue;
            };

            snippets.push(format!(
                "{} — {}",
                hit.title.as_deref().unwrap_or(""),
                hit.snippet.as_deref().unwrap_or("")
            ));

            sources.push(SourceEvidence {
                trust_weight: self.trust.weight(&url),
                url,
                title: hit.title,
                snippet: hit.snippet,
            });
        }
        snippets.truncate(self.limits.snippets_per_assessment);

        // Step 4: assess
        let attempt = self.assess(&claim.text, &snippets).await;
        if let Some(reason) = attempt.failure() {
            trace.assessment_failures += 1;
            warn!(claim = %claim.text, error = %reason, "Assessment failed, substituting neutral verdict");
        }
        let verdict = attempt.or_substitute(AssessmentVerdict::parse_error);

        ClaimAssessment {
            claim: Claim {
                text: claim.text.clone(),
                snippet: claim.snippet.clone(),
                proposed_queries: queries,
            },
            support_score: unit(verdict.support_score),
            contradiction_score: unit(verdict.contradiction_score),
            sources,
            rationale: verdict.rationale,
        }
    }

    async fn search_query(&self, query: &str) -> Attempt<Vec<SearchHit>> {
        let limit = self.limits.results_per_query;

        let result = self.search_retry
            .retry("web_search", || self.search.search(query, limit))
            .await
            .map(|mut hits| {
                hits.truncate(limit);
                hits
            });

        Attempt::from(result)
    }

    async fn assess(&self, claim: &str, snippets: &[String]) -> Attempt<AssessmentVerdict> {
        Attempt::from(self.assessor.assess(claim, snippets).await)
    }
}

/// The claim's proposed queries, or the claim text when there are none.
fn resolve_queries(claim: &Claim) -> Vec<String> {
    let queries: Vec<String> = claim
        .proposed_queries
        .iter()
        .filter(|q| !q.trim().is_empty())
        .cloned()
        .collect();

    if queries.is_empty() {
        vec![claim.text.clone()]
    } else {
        queries
    }
}

fn unit(score: f64) -> f64 {
    if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn hit(url: &str, title: &str, snippet: &str) -> SearchHit {
        SearchHit {
            url: (!url.is_empty()).then(|| url.to_string()),
            title: (!title.is_empty()).then(|| title.to_string()),
            snippet: (!snippet.is_empty()).then(|| snippet.to_string()),
        }
    }

    /// Returns canned hits per query and records every call.
    #[derive(Default)]
    struct CannedSearch {
        hits: HashMap<String, Vec<SearchHit>>,
        failing: Vec<String>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl WebSearch for CannedSearch {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
            self.calls.lock().unwrap().push((query.to_string(), max_results));
            if self.failing.iter().any(|q| q == query) {
                anyhow::bail!("provider unavailable");
            }
            Ok(self.hits.get(query).cloned().unwrap_or_default())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl WebSearch for FailingSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            anyhow::bail!("network down")
        }
    }

    /// Verdict per claim text; unknown claims fail.
    #[derive(Default)]
    struct CannedAssessor {
        verdicts: HashMap<String, (f64, f64)>,
        seen_snippets: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl ClaimAssessor for CannedAssessor {
        async fn assess(&self, claim: &str, snippets: &[String]) -> Result<AssessmentVerdict> {
            self.seen_snippets.lock().unwrap().push(snippets.to_vec());
            let (support, contradiction) = self
                .verdicts
                .get(claim)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("unparsable reply"))?;
            Ok(AssessmentVerdict {
                support_score: support,
                contradiction_score: contradiction,
                rationale: format!("checked {claim}"),
            })
        }
    }

    fn claim(text: &str, queries: &[&str]) -> Claim {
        Claim {
            text: text.to_string(),
            snippet: None,
            proposed_queries: queries.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_failing_search_still_yields_assessment() {
        let assessor = Arc::new(CannedAssessor {
            verdicts: HashMap::from([("c1".to_string(), (0.3, 0.1))]),
            ..Default::default()
        });
        let pipeline = EvidencePipeline::new(Arc::new(FailingSearch), assessor.clone());

        let run = pipeline.run(&[claim("c1", &["a", "b", "c", "d"])]).await;

        assert_eq!(run.assessments.len(), 1);
        let a = &run.assessments[0];
        assert!(a.sources.is_empty());
        assert_eq!(a.support_score, 0.3);
        assert_eq!(run.trace.queries_issued, 3);
        assert_eq!(run.trace.search_failures, 3);
        assert_eq!(assessor.seen_snippets.lock().unwrap()[0], Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_assessment_failure_substitutes_parse_error() {
        let pipeline = EvidencePipeline::new(
            Arc::new(FailingSearch),
            Arc::new(CannedAssessor::default()),
        );

        let run = pipeline.run(&[claim("unknown", &[])]).await;
        let a = &run.assessments[0];

        assert_eq!(a.support_score, 0.0);
        assert_eq!(a.contradiction_score, 0.0);
        assert_eq!(a.rationale, "Parse error");
        assert_eq!(run.trace.assessment_failures, 1);
    }

    #[tokio::test]
    async fn test_queries_fall_back_to_claim_text_and_are_capped() {
        let search = Arc::new(CannedSearch::default());
        let pipeline = EvidencePipeline::new(search.clone(), Arc::new(CannedAssessor::default()));

        pipeline
            .run(&[claim("bare claim", &[]), claim("many", &["q1", " ", "q2", "q3", "q4"])])
            .await;

        let calls = search.calls.lock().unwrap().clone();
        let queries: Vec<&str> = calls.iter().map(|(q, _)| q.as_str()).collect();
        assert_eq!(queries, vec!["bare claim", "q1", "q2", "q3"]);
        assert!(calls.iter().all(|(_, max)| *max == 3));
    }

    #[tokio::test]
    async fn test_sources_take_first_five_then_drop_missing_urls() {
        let search = Arc::new(CannedSearch {
            hits: HashMap::from([
                (
                    "q1".to_string(),
                    vec![
                        hit("https://www.cdc.gov/a", "CDC", "vaccines"),
                        hit("", "No url", "dropped"),
                        hit("https://blog.example/b", "", "blog"),
                    ],
                ),
                (
                    "q2".to_string(),
                    vec![
                        hit("https://www.reuters.com/c", "Reuters", ""),
                        hit("https://mit.edu/d", "MIT", "paper"),
                        hit("https://late.example/e", "Late", "beyond cap"),
                    ],
                ),
            ]),
            failing: vec!["q3".to_string()],
            ..Default::default()
        });
        let assessor = Arc::new(CannedAssessor {
            verdicts: HashMap::from([("c".to_string(), (0.9, 0.0))]),
            ..Default::default()
        });
        let pipeline = EvidencePipeline::new(search, assessor.clone());

        let run = pipeline.run(&[claim("c", &["q1", "q2", "q3"])]).await;
        let sources = &run.assessments[0].sources;

        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.cdc.gov/a",
                "https://blog.example/b",
                "https://www.reuters.com/c",
                "https://mit.edu/d",
            ]
        );
        let weights: Vec<f64> = sources.iter().map(|s| s.trust_weight).collect();
        assert_eq!(weights, vec![1.0, 0.6, 0.85, 0.9]);

        let snippets = assessor.seen_snippets.lock().unwrap()[0].clone();
        assert_eq!(snippets[0], "CDC — vaccines");
        assert_eq!(snippets[1], " — blog");
        assert_eq!(snippets[2], "Reuters — ");
        assert_eq!(run.trace.search_failures, 1);
    }

    #[tokio::test]
    async fn test_global_sources_follow_claim_order_with_duplicates() {
        let search = Arc::new(CannedSearch {
            hits: HashMap::from([("same".to_string(), vec![hit("https://x.gov/1", "X", "")])]),
            ..Default::default()
        });
        let pipeline = EvidencePipeline::new(search, Arc::new(CannedAssessor::default()));

        let run = pipeline
            .run(&[claim("first", &["same"]), claim("second", &["same"])])
            .await;

        assert_eq!(run.sources.len(), 2);
        assert_eq!(run.sources[0], run.sources[1]);
        assert_eq!(run.assessments[0].claim.text, "first");
        assert_eq!(run.assessments[1].claim.text, "second");
    }

    #[tokio::test]
    async fn test_out_of_range_verdicts_are_clamped() {
        let assessor = Arc::new(CannedAssessor {
            verdicts: HashMap::from([("c".to_string(), (1.4, f64::NAN))]),
            ..Default::default()
        });
        let pipeline = EvidencePipeline::new(Arc::new(FailingSearch), assessor);

        let run = pipeline.run(&[claim("c", &[])]).await;
        assert_eq!(run.assessments[0].support_score, 1.0);
        assert_eq!(run.assessments[0].contradiction_score, 0.0);
    }

    #[tokio::test]
    async fn test_search_retry_policy_applies() {
        let search = Arc::new(CannedSearch {
            failing: vec!["q".to_string()],
            ..Default::default()
        });
        let pipeline = EvidencePipeline::new(search.clone(), Arc::new(CannedAssessor::default()))
            .with_search_retry(RetryPolicy::new(2, 1, 1));

        let run = pipeline.run(&[claim("c", &["q"])]).await;

        assert_eq!(search.calls.lock().unwrap().len(), 3);
        assert_eq!(run.trace.search_failures, 1);
    }

    #[tokio::test]
    async fn test_custom_table_and_limits() {
        let search = Arc::new(CannedSearch {
            hits: HashMap::from([(
                "q".to_string(),
                vec![
                    hit("https://news.example/a", "A", ""),
                    hit("https://www.cdc.gov/b", "B", ""),
                ],
            )]),
            ..Default::default()
        });
        let table = TrustWeightTable::new(vec![("news.example".to_string(), 0.7)], 0.2);
        let limits = PipelineLimits {
            sources_per_claim: 1,
            ..PipelineLimits::default()
        };
        let pipeline = EvidencePipeline::new(search, Arc::new(CannedAssessor::default()))
            .with_trust_table(table)
            .with_limits(limits);

        let run = pipeline.run(&[claim("c", &["q"])]).await;

        assert_eq!(run.sources.len(), 1);
        assert_eq!(run.sources[0].trust_weight, 0.7);
    }

    #[tokio::test]
    async fn test_assessor_sees_at_most_eight_snippets() {
        let hits_for = |q: &str| -> Vec<SearchHit> {
            (0..3)
                .map(|i| hit(&format!("https://{q}{i}.example"), &format!("{q}{i}"), "text"))
                .collect()
        };
        let search = Arc::new(CannedSearch {
            hits: HashMap::from([
                ("q1".to_string(), hits_for("q1")),
                ("q2".to_string(), hits_for("q2")),
                ("q3".to_string(), hits_for("q3")),
            ]),
            ..Default::default()
        });
        let assessor = Arc::new(CannedAssessor::default());
        let limits = PipelineLimits {
            sources_per_claim: 12,
            ..PipelineLimits::default()
        };
        let pipeline = EvidencePipeline::new(search, assessor.clone()).with_limits(limits);

        let run = pipeline.run(&[claim("c", &["q1", "q2", "q3"])]).await;

        assert_eq!(run.assessments[0].sources.len(), 9);
        let snippets = assessor.seen_snippets.lock().unwrap()[0].clone();
        assert_eq!(snippets.len(), 8);
        assert_eq!(snippets[7], "q31 — text");
    }
}
