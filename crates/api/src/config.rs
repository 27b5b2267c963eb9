use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

/// API key wrapper that never shows up in logs.
#[derive(Clone, PartialEq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub transcript: TranscriptConfig,
    pub pipeline: PipelineConfig,
    pub concurrency: ConcurrencyConfig,
    pub retry: RetryConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<Secret>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub api_key: Option<Secret>,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub max_claims: usize,
    pub max_sources_per_claim: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcurrencyConfig {
    pub max_concurrent_analyses: usize,
    pub request_timeout_secs: u64,
}

/// Retries for web search calls. Zero keeps the single-attempt policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format `{}` (expected `pretty` or `json`)", other),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                max_tokens: 1000,
            },
            search: SearchConfig {
                api_key: None,
                base_url: "https://api.tavily.com".to_string(),
            },
            transcript: TranscriptConfig {
                base_url: "https://www.youtube.com".to_string(),
            },
            pipeline: PipelineConfig {
                max_claims: 8,
                max_sources_per_claim: 5,
            },
            concurrency: ConcurrencyConfig {
                max_concurrent_analyses: 4,
                request_timeout_secs: 60,
            },
            retry: RetryConfig {
                max_retries: 0,
                initial_backoff_ms: 500,
                max_backoff_ms: 5000,
            },
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment, after loading a
    /// `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup. Unset or blank
    /// variables fall back to defaults; unparsable numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            server: ServerConfig {
                host: get("HOST").unwrap_or(defaults.server.host),
                port: parse_or(&get, "PORT", defaults.server.port)?,
            },
            llm: LlmConfig {
                api_key: get("OPENAI_API_KEY").map(Secret),
                base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.llm.base_url),
                model: get("OPENAI_MODEL").unwrap_or(defaults.llm.model),
                max_tokens: parse_or(&get, "LLM_MAX_TOKENS", defaults.llm.max_tokens)?,
            },
            search: SearchConfig {
                api_key: get("TAVILY_API_KEY").map(Secret),
                base_url: get("TAVILY_BASE_URL").unwrap_or(defaults.search.base_url),
            },
            transcript: TranscriptConfig {
                base_url: get("YOUTUBE_BASE_URL").unwrap_or(defaults.transcript.base_url),
            },
            pipeline: PipelineConfig {
                max_claims: parse_or(&get, "MAX_CLAIMS", defaults.pipeline.max_claims)?,
                max_sources_per_claim: parse_or(
                    &get,
                    "MAX_SOURCES_PER_CLAIM",
                    defaults.pipeline.max_sources_per_claim,
                )?,
            },
            concurrency: ConcurrencyConfig {
                max_concurrent_analyses: parse_or(
                    &get,
                    "MAX_CONCURRENT_ANALYSES",
                    defaults.concurrency.max_concurrent_analyses,
                )?,
                request_timeout_secs: parse_or(
                    &get,
                    "REQUEST_TIMEOUT_SECS",
                    defaults.concurrency.request_timeout_secs,
                )?,
            },
            retry: RetryConfig {
                max_retries: parse_or(&get, "SEARCH_MAX_RETRIES", defaults.retry.max_retries)?,
                initial_backoff_ms: parse_or(
                    &get,
                    "SEARCH_INITIAL_BACKOFF_MS",
                    defaults.retry.initial_backoff_ms,
                )?,
                max_backoff_ms: parse_or(&get, "SEARCH_MAX_BACKOFF_MS", defaults.retry.max_backoff_ms)?,
            },
            log_format: parse_or(&get, "LOG_FORMAT", defaults.log_format)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: `{}`", key, raw)),
        None => Ok(default),
    }
}
