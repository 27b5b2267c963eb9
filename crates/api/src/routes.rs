use axum::{Json, extract::State};
use evidence::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};
use url::Url;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::limiter::Permit;
use crate::metrics::{MetricsSnapshot, TimedOperation};

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub name: &'static str,
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm: &'static str,
    pub search: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct WebRequest {
    pub url: String,
    pub extracted_text: String,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeRequest {
    pub url: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: "TruthLens",
        ok: true,
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        llm: provider_status(state.providers.llm_configured),
        search: provider_status(state.providers.search_configured),
    })
}

fn provider_status(configured: bool) -> &'static str {
    if configured { "configured" } else { "missing api key" }
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

pub async fn analyze_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> ApiResult<Json<AnalysisResult>> {
    let _permit = admit(&state, "text")?;
    run_analysis(&state, "text", &req.content).await
}

pub async fn analyze_web(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WebRequest>,
) -> ApiResult<Json<AnalysisResult>> {
    let _permit = admit(&state, "web")?;
    validate_web_url(&req.url)?;

    if req.extracted_text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Provide extracted text (public domain or your own).".to_string(),
        ));
    }

    run_analysis(&state, "web", &req.extracted_text).await
}

pub async fn analyze_youtube(
    State(state): State<Arc<AppState>>,
    Json(req): Json<YouTubeRequest>,
) -> ApiResult<Json<AnalysisResult>> {
    // Permit first: a rejected request must not fetch a transcript.
    let _permit = admit(&state, "youtube")?;
    let transcript = state.transcripts.fetch(&req.url).await.ok_or_else(|| {
        ApiError::NotFound("No public transcript found. Paste text instead.".to_string())
    })?;

    info!(
        url = %req.url,
        segments = transcript.segments.len(),
        "Fetched transcript"
    );

    run_analysis(&state, "youtube", &transcript.text).await
}

fn validate_web_url(raw: &str) -> ApiResult<()> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| ApiError::BadRequest(format!("Invalid URL `{}`: {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ApiError::BadRequest(format!(
            "Unsupported URL scheme `{}`, expected http or https",
            other
        ))),
    }
}

/// Claim an in-flight slot for the rest of the handler, or reject with 429.
fn admit(state: &AppState, source: &'static str) -> ApiResult<Permit> {
    state.limiter.try_acquire().ok_or_else(|| {
        state.metrics.record_rejected();
        warn!(
            source,
            capacity = state.limiter.capacity(),
            "Rejecting analysis, too many in flight"
        );
        ApiError::TooManyRequests(format!(
            "Too many analyses in progress (limit {}). Try again shortly.",
            state.limiter.capacity()
        ))
    })
}

/// Run one analysis inside a span tagged with a fresh request id. Callers
/// hold a limiter permit.
async fn run_analysis(
    state: &AppState,
    source: &'static str,
    content: &str,
) -> ApiResult<Json<AnalysisResult>> {
    let span = info_span!("analysis", request_id = %Uuid::new_v4(), source);

    async {
        let timer = TimedOperation::start();

        match state.analyzer.analyze(content).await {
            Ok(analysis) => {
                state.metrics.record_request(true);
                state.metrics.record_analysis(timer.elapsed(), &analysis);
                info!(
                    elapsed_ms = timer.elapsed().as_millis() as u64,
                    queries = analysis.trace.queries_issued,
                    search_failures = analysis.trace.search_failures,
                    assessment_failures = analysis.trace.assessment_failures,
                    "Analysis served"
                );
                Ok(Json(analysis.result))
            }
            Err(e) => {
                state.metrics.record_request(false);
                warn!(error = %e, "Analysis failed");
                Err(ApiError::from(e))
            }
        }
    }
    .instrument(span)
    .await
}
