use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Two 10 MiB documents as base64 JSON on the proxy routes, plus headroom.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Built once at startup and handed to every component that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the evaluation backend, without a trailing slash.
    pub api_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    /// `api_base_url` overrides `EVALUATOR_API_URL` when given.
    pub fn from_env(api_base_url: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_base_url = match api_base_url {
            Some(url) => url.to_string(),
            None => require_env("EVALUATOR_API_URL")?,
        };

        Ok(Config {
            api_base_url: normalize_base_url(&api_base_url),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            poll_interval: Duration::from_millis(parse_env(
                "POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )?),
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Config pointing at `api_base_url` with every other field at its default.
    pub fn for_backend(api_base_url: &str) -> Self {
        Config {
            api_base_url: normalize_base_url(api_base_url),
            port: 8080,
            rust_log: "info".to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
