pub mod config;
pub mod error;
pub mod limiter;
pub mod metrics;
pub mod routes;
pub mod telemetry;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use evidence::{Analyzer, EvidencePipeline, PipelineLimits, RetryPolicy};
use extract::{ChatClient, LlmAnalyst};
use ingest::{TranscriptFetcher, YouTubeTranscripts};
use search::TavilyClient;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::limiter::RequestLimiter;
use crate::metrics::Metrics;

/// Which external providers have credentials, as reported by `/health`.
#[derive(Debug, Clone, Copy)]
pub struct ProviderStatus {
    pub llm_configured: bool,
    pub search_configured: bool,
}

pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub transcripts: Arc<dyn TranscriptFetcher>,
    pub limiter: RequestLimiter,
    pub metrics: Arc<Metrics>,
    pub providers: ProviderStatus,
}

impl AppState {
    pub fn new(
        analyzer: Analyzer,
        transcripts: Arc<dyn TranscriptFetcher>,
        max_concurrent_analyses: usize,
        providers: ProviderStatus,
    ) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            transcripts,
            limiter: RequestLimiter::new(max_concurrent_analyses),
            metrics: Metrics::new(),
            providers,
        }
    }
}

/// Build the production analyzer from configuration: OpenAI-compatible
/// chat for summary, claims and assessment, Tavily for search.
pub fn build_analyzer(config: &AppConfig) -> Result<(Analyzer, ProviderStatus)> {
    let timeout = Duration::from_secs(config.concurrency.request_timeout_secs);

    let chat = ChatClient::new(
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        config.llm.api_key.as_ref().map(|k| k.expose().to_string()),
        config.llm.max_tokens,
        timeout,
    )
    .context("Failed to create LLM client")?;

    let tavily = TavilyClient::new(
        config.search.base_url.clone(),
        config.search.api_key.as_ref().map(|k| k.expose().to_string()),
        timeout,
    )
    .context("Failed to create search client")?;

    let providers = ProviderStatus {
        llm_configured: chat.is_configured(),
        search_configured: tavily.is_configured(),
    };

    let analyst = Arc::new(LlmAnalyst::new(chat));
    let limits = PipelineLimits {
        sources_per_claim: config.pipeline.max_sources_per_claim,
        ..PipelineLimits::default()
    };
    let retry = RetryPolicy::new(
        config.retry.max_retries,
        config.retry.initial_backoff_ms,
        config.retry.max_backoff_ms,
    );

    let pipeline = EvidencePipeline::new(Arc::new(tavily), analyst.clone())
        .with_limits(limits)
        .with_search_retry(retry);

    let analyzer = Analyzer::new(analyst.clone(), analyst, pipeline)
        .with_max_claims(config.pipeline.max_claims);

    Ok((analyzer, providers))
}

pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let (analyzer, providers) = build_analyzer(config)?;

    let transcripts = YouTubeTranscripts::new(
        config.transcript.base_url.clone(),
        Duration::from_secs(config.concurrency.request_timeout_secs),
    )
    .context("Failed to create transcript client")?;

    Ok(AppState::new(
        analyzer,
        Arc::new(transcripts),
        config.concurrency.max_concurrent_analyses,
        providers,
    ))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .route("/analyze/text", post(routes::analyze_text))
        .route("/analyze/web", post(routes::analyze_web))
        .route("/analyze/youtube", post(routes::analyze_youtube))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
