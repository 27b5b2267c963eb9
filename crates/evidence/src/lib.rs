pub mod analyzer;
pub mod attempt;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod sections;

pub use analyzer::{Analysis, AnalysisError, Analyzer, DEFAULT_MAX_CLAIMS};
pub use attempt::Attempt;
pub use model::{AnalysisResult, ClaimAssessment, SourceEvidence};
pub use pipeline::{EvidencePipeline, EvidenceRun, PipelineLimits, PipelineTrace};
pub use report::{MAX_GLOBAL_SOURCES, ReportComposer, render_markdown};
pub use retry::RetryPolicy;
pub use sections::{SummarySections, split_sections};
