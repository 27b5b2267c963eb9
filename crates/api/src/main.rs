use anyhow::{Context, Result};
use api::config::AppConfig;
use api::{build_router, build_state, telemetry};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    telemetry::init_tracing(config.log_format);

    let state = Arc::new(build_state(&config)?);

    if !state.providers.llm_configured {
        tracing::warn!("OPENAI_API_KEY is not set, analyses will fail at summarization");
    }
    if !state.providers.search_configured {
        tracing::warn!("TAVILY_API_KEY is not set, claims will be assessed without sources");
    }

    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(
        address = %address,
        model = %config.llm.model,
        max_claims = config.pipeline.max_claims,
        max_concurrent = config.concurrency.max_concurrent_analyses,
        "TruthLens API listening"
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
