#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use web::config::Config;

/// In-process stand-in for the evaluation backend, mounted under `/api`.
#[derive(Default)]
pub struct FakeBackendState {
    pub calls: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<Value>>,
    pub evaluations: Mutex<Vec<Value>>,
    /// Snapshots served in order; the last one is repeated once the queue is empty.
    pub results: Mutex<VecDeque<Value>>,
    pub last_result: Mutex<Option<Value>>,
    pub upload_failure: Mutex<Option<(u16, String)>>,
}

pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Arc<FakeBackendState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeBackendState::default());
        let app = Router::new()
            .route("/api/upload", post(upload))
            .route("/api/evaluate", post(evaluate))
            .route("/api/result/:job_id", get(result))
            .layer(DefaultBodyLimit::disable())
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve fake backend") });

        FakeBackend { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client config against this backend with a short poll interval.
    pub fn config(&self) -> Config {
        Config::for_backend(&self.base_url()).with_poll_interval(Duration::from_millis(50))
    }

    pub fn script_results(&self, snapshots: Vec<Value>) {
        *self.state.results.lock().unwrap() = snapshots.into();
    }

    pub fn fail_upload(&self, status: u16, body: &str) {
        *self.state.upload_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }
}

async fn upload(State(state): State<Arc<FakeBackendState>>, Json(body): Json<Value>) -> Response {
    state.calls.lock().unwrap().push("upload".into());
    state.uploads.lock().unwrap().push(body);

    if let Some((status, message)) = state.upload_failure.lock().unwrap().clone() {
        let status = StatusCode::from_u16(status).expect("valid status");
        return (status, Json(json!({ "detail": message }))).into_response();
    }

    Json(json!({
        "cv_document": { "id": "c1", "filename": "cv.pdf" },
        "project_document": { "id": "p1", "filename": "project.pdf" },
        "message": "Documents uploaded successfully"
    }))
    .into_response()
}

async fn evaluate(State(state): State<Arc<FakeBackendState>>, Json(body): Json<Value>) -> Response {
    state.calls.lock().unwrap().push("evaluate".into());
    state.evaluations.lock().unwrap().push(body);
    Json(json!({ "id": "job-42", "status": "queued" })).into_response()
}

async fn result(
    State(state): State<Arc<FakeBackendState>>,
    Path(job_id): Path<String>,
) -> Response {
    state.calls.lock().unwrap().push(format!("result/{job_id}"));

    let next = state.results.lock().unwrap().pop_front();
    let snapshot = match next {
        Some(snapshot) => {
            *state.last_result.lock().unwrap() = Some(snapshot.clone());
            Some(snapshot)
        }
        None => state.last_result.lock().unwrap().clone(),
    };

    match snapshot {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Evaluation job with ID {job_id} not found") })),
        )
            .into_response(),
    }
}

pub fn queued(id: &str) -> Value {
    json!({
        "id": id,
        "status": "queued",
        "result": null,
        "error_message": null,
        "created_at": "2025-01-01T10:00:00",
        "completed_at": null
    })
}

pub fn completed(id: &str) -> Value {
    json!({
        "id": id,
        "status": "completed",
        "result": {
            "cv_match_rate": 0.82,
            "cv_feedback": "Solid backend experience with Go and Python.",
            "project_score": 4.35,
            "project_feedback": "Clear retry handling and good test coverage.",
            "overall_summary": "Strong candidate for the backend role."
        },
        "error_message": null,
        "created_at": "2025-01-01T10:00:00",
        "completed_at": "2025-01-01T10:01:30"
    })
}

pub fn failed(id: &str, message: &str) -> Value {
    json!({
        "id": id,
        "status": "failed",
        "error_message": message,
        "created_at": "2025-01-01T10:00:00"
    })
}

/// Address nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}
