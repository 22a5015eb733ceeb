//! Same-origin pass-through to the backend's upload and evaluate endpoints.
//!
//! Bodies go through untouched. The only thing added here is the 500 error
//! body when the relay itself fails.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::backend_client::{BackendClient, RelayedResponse};
use crate::errors::AppError;
use crate::state::AppState;

const JSON_CONTENT_TYPE: &str = "application/json";

/// POST /api/proxy-upload
pub async fn handle_proxy_upload(State(state): State<AppState>, body: Bytes) -> Response {
    proxy(&state.backend, "upload", &body).await
}

/// POST /api/proxy-evaluate
pub async fn handle_proxy_evaluate(State(state): State<AppState>, body: Bytes) -> Response {
    proxy(&state.backend, "evaluate", &body).await
}

async fn proxy(backend: &BackendClient, action: &'static str, body: &[u8]) -> Response {
    match relay(backend, action, body).await {
        Ok(response) => response,
        Err(details) => AppError::Proxy { action, details }.into_response(),
    }
}

async fn relay(backend: &BackendClient, action: &str, body: &[u8]) -> Result<Response, String> {
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {e}"))?;

    let relayed = backend
        .relay(action, &payload)
        .await
        .map_err(|e| e.to_string())?;
    debug!("proxy {action}: backend answered {}", relayed.status);

    into_response(relayed)
}

/// Success bodies must be JSON and are re-emitted as such; error bodies are
/// relayed verbatim with the backend's status.
fn into_response(relayed: RelayedResponse) -> Result<Response, String> {
    let status = StatusCode::from_u16(relayed.status.as_u16())
        .map_err(|e| format!("backend returned an invalid status: {e}"))?;

    if status.is_success() {
        serde_json::from_slice::<serde_json::Value>(&relayed.body)
            .map_err(|e| format!("backend returned a non-JSON body: {e}"))?;
        return Ok((
            status,
            [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
            Body::from(relayed.body),
        )
            .into_response());
    }

    let content_type = relayed
        .content_type
        .unwrap_or_else(|| "text/plain; charset=utf-8".to_string());
    Ok((
        status,
        [(header::CONTENT_TYPE, content_type)],
        Body::from(relayed.body),
    )
        .into_response())
}
