//! Backend client: the single point of entry for all calls to the evaluation backend.
//!
//! Submission, polling and the proxy routes all go through this module.
//! There are no retries here. Every failure is terminal for the current attempt.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{
    EvaluateRequest, EvaluateResponse, EvaluationJob, UploadRequest, UploadResponse,
};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// The three backend operations the frontend depends on.
/// Implemented by [`BackendClient`]; tests substitute recording fakes.
#[async_trait]
pub trait EvaluatorApi: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, BackendError>;

    async fn evaluate(&self, request: &EvaluateRequest) -> Result<EvaluateResponse, BackendError>;

    async fn fetch_job(&self, job_id: &str) -> Result<EvaluationJob, BackendError>;
}

/// Whether `segment` survives URL path joining as itself. Empty, `.` and `..`
/// segments would be dropped or resolved away instead of encoded.
pub fn is_path_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
}

/// Raw backend response relayed untouched by the proxy routes.
#[derive(Debug)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        Self::with_timeout(&config.api_base_url, config.request_timeout)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        if let Some(bad) = segments.iter().find(|s| !is_path_segment(s)) {
            return Err(BackendError::InvalidUrl(format!(
                "'{bad}' is not a usable path segment"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&[path])?;
        debug!("POST {url}");

        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }

    /// Forwards a JSON body verbatim to `{base}/{path}` and returns the backend's
    /// status, content type and body without interpreting them.
    pub async fn relay(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<RelayedResponse, BackendError> {
        let url = self.endpoint(&[path])?;
        debug!("relaying POST {url}");

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;

        Ok(RelayedResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl EvaluatorApi for BackendClient {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, BackendError> {
        self.post_json("upload", request).await
    }

    async fn evaluate(&self, request: &EvaluateRequest) -> Result<EvaluateResponse, BackendError> {
        self.post_json("evaluate", request).await
    }

    async fn fetch_job(&self, job_id: &str) -> Result<EvaluationJob, BackendError> {
        let url = self.endpoint(&["result", job_id])?;
        debug!("GET {url}");

        // Snapshots must never come from a cache.
        let response = self
            .client
            .get(url)
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("backend returned {}: {}", status, body);
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(BackendError::Decode)
}
