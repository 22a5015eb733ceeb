use std::sync::Arc;

use crate::backend_client::{BackendClient, BackendError};
use crate::config::Config;
use crate::polling::ResultsPoller;
use crate::submission::SubmissionFlow;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Raw client, used by the pass-through proxy routes.
    pub backend: BackendClient,
    pub submission: SubmissionFlow,
    pub poller: ResultsPoller,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config)?;
        let api = Arc::new(backend.clone());
        Ok(AppState {
            submission: SubmissionFlow::new(api.clone()),
            poller: ResultsPoller::new(api, config.poll_interval),
            backend,
            config,
        })
    }
}
