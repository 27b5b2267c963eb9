use anyhow::{Context, Result};
use api::build_analyzer;
use api::config::AppConfig;
use api::telemetry;
use clap::Parser;
use ingest::{TranscriptFetcher, YouTubeTranscripts};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Fact-check a piece of content and print the TruthLens report.
#[derive(Debug, Parser)]
#[command(name = "truthlens", version)]
struct Cli {
    /// Read content from this file
    #[arg(short, long, conflicts_with = "youtube")]
    file: Option<PathBuf>,

    /// Analyze the public transcript of this YouTube video
    #[arg(short, long)]
    youtube: Option<String>,

    /// Print the full analysis as JSON instead of Markdown
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    telemetry::init_tracing(config.log_format);

    let content = match (&cli.file, &cli.youtube) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(url)) => fetch_transcript(&config, url).await?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let (analyzer, providers) = build_analyzer(&config)?;
    if !providers.search_configured {
        tracing::warn!("TAVILY_API_KEY is not set, claims will be assessed without sources");
    }

    let analysis = analyzer.analyze(&content).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis.result)?);
    } else {
        println!("{}", analysis.result.markdown_report);
    }

    Ok(())
}

async fn fetch_transcript(config: &AppConfig, url: &str) -> Result<String> {
    let transcripts = YouTubeTranscripts::new(
        config.transcript.base_url.clone(),
        Duration::from_secs(config.concurrency.request_timeout_secs),
    )?;

    match transcripts.fetch(url).await {
        Some(transcript) => Ok(transcript.text),
        None => anyhow::bail!("No public transcript found for {}. Paste text instead.", url),
    }
}
