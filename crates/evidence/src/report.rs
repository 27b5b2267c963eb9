use crate::model::{AnalysisResult, ClaimAssessment, SourceEvidence};
use crate::sections::SummarySections;

/// Cap on the deduplicated-by-position source list of a result.
pub const MAX_GLOBAL_SOURCES: usize = 20;

/// Assembles the final result and its Markdown rendering.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    max_sources: usize,
}

impl ReportComposer {
    pub fn new(max_sources: usize) -> Self {
        Self { max_sources }
    }

    pub fn compose(
        &self,
        sections: SummarySections,
        assessments: Vec<ClaimAssessment>,
        truth_score: f64,
        star_rating: f64,
    ) -> AnalysisResult {
        let sources: Vec<SourceEvidence> = assessments
            .iter()
            .flat_map(|a| a.sources.iter().cloned())
            .take(self.max_sources)
            .collect();

        let markdown_report = render_markdown(&sections, &assessments, truth_score, star_rating);

        AnalysisResult {
            tldr: sections.tldr,
            summary: sections.executive_summary,
            deep_dive: sections.deep_dive,
            claims: assessments,
            truth_score,
            star_rating,
            sources,
            markdown_report,
        }
    }
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new(MAX_GLOBAL_SOURCES)
    }
}

pub fn render_markdown(
    sections: &SummarySections,
    assessments: &[ClaimAssessment],
    truth_score: f64,
    star_rating: f64,
) -> String {
    let mut md = String::new();

    md.push_str("# TruthLens Report\n");
    md.push_str(&format!("**Truth Score:** {:?}/100  \n", truth_score));
    md.push_str(&format!("**Stars (Critical Style):** {:?}/5\n\n", star_rating));

    md.push_str("## TL;DR\n");
    md.push_str(&render_bullets(&sections.tldr));
    md.push_str("\n\n");

    md.push_str("## Executive Summary\n");
    md.push_str(&sections.executive_summary);
    md.push_str("\n\n");

    md.push_str("## Deep Dive\n");
    md.push_str(&sections.deep_dive);
    md.push_str("\n\n");

    md.push_str("## Claims & Evidence\n");
    if assessments.is_empty() {
        md.push_str("_No claims extracted._");
    } else {
        let blocks: Vec<String> = assessments.iter().map(render_claim).collect();
        md.push_str(&blocks.join("\n"));
    }
    md.push('\n');

    md
}

/// `- item` per line. An empty list still renders a lone bullet so the
/// heading keeps a body.
fn render_bullets(items: &[String]) -> String {
    format!("- {}", items.join("\n- "))
}

fn render_claim(assessment: &ClaimAssessment) -> String {
    let links = assessment
        .sources
        .iter()
        .map(render_link)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "- **Claim:** {}\n  - Support: {:.2}, Contra: {:.2}\n  - Rationale: {}\n  - Sources: {}",
        assessment.claim.text,
        assessment.support_score,
        assessment.contradiction_score,
        assessment.rationale,
        links
    )
}

fn render_link(source: &SourceEvidence) -> String {
    let label = source.label().replace('[', "\\[").replace(']', "\\]");
    format!("[{}]({})", label, source.url)
}
