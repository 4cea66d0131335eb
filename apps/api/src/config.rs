use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// The LLM key is optional: without it every question falls back to the generic one.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub generation_timeout: Duration,
    /// Sessions untouched for this long are dropped.
    pub session_idle_ttl: Duration,
    /// Grace period before a concluded session is dropped.
    pub session_concluded_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("LLM_API_KEY").or_else(|| optional_env("TOGETHER_API_KEY")),
            llm_api_url: optional_env("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            generation_timeout: secs_env("GENERATION_TIMEOUT_SECS", 30)?,
            session_idle_ttl: secs_env("SESSION_IDLE_TTL_SECS", 1800)?,
            session_concluded_ttl: secs_env("SESSION_CONCLUDED_TTL_SECS", 300)?,
            session_sweep_interval: secs_env("SESSION_SWEEP_INTERVAL_SECS", 60)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_env(key: &str, default: u64) -> Result<Duration> {
    let secs = match optional_env(key) {
        Some(value) => value
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds"))?,
        None => default,
    };
    if secs == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
