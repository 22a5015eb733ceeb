use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend_client::EvaluatorApi;
use crate::polling::{advance, PollStep, ResultsView, FETCH_ERROR_MESSAGE};

/// Starts one poll task per results view.
#[derive(Clone)]
pub struct ResultsPoller {
    api: Arc<dyn EvaluatorApi>,
    interval: Duration,
}

impl ResultsPoller {
    pub fn new(api: Arc<dyn EvaluatorApi>, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// Spawns the poll task for `job_id`. The task lives exactly as long as the
    /// returned handle: dropping it cancels the next scheduled fetch.
    pub fn watch(&self, job_id: impl Into<String>) -> PollHandle {
        let job_id = job_id.into();
        let (view_tx, view_rx) = watch::channel(ResultsView::Loading);
        let (stop_tx, stop_rx) = watch::channel(false);

        tokio::spawn(poll_job(
            self.api.clone(),
            job_id.clone(),
            self.interval,
            view_tx,
            stop_rx,
        ));

        PollHandle {
            job_id,
            view: view_rx,
            stop: stop_tx,
        }
    }
}

/// Fetch → publish → wait, one fetch at a time. A fetch already in flight when
/// the view is torn down runs to completion, but its snapshot is discarded.
async fn poll_job(
    api: Arc<dyn EvaluatorApi>,
    job_id: String,
    interval: Duration,
    view: watch::Sender<ResultsView>,
    mut stop: watch::Receiver<bool>,
) {
    let mut progress = 0;

    loop {
        let fetched = api.fetch_job(&job_id).await;
        if *stop.borrow() {
            debug!("results view for {job_id} closed, discarding snapshot");
            return;
        }

        let step = match fetched {
            Ok(job) => {
                let status = job.status;
                let (next, step) = advance(job, progress);
                progress = next.progress();
                debug!("job {job_id} is {status:?} ({progress}%)");
                view.send_replace(next);
                step
            }
            Err(e) => {
                warn!("fetching job {job_id} failed: {e}");
                view.send_replace(ResultsView::Error {
                    message: FETCH_ERROR_MESSAGE.to_string(),
                });
                PollStep::Stop
            }
        };

        if step == PollStep::Stop {
            info!("stopped polling job {job_id}");
            return;
        }

        tokio::select! {
            biased;
            _ = stop.changed() => {
                debug!("results view for {job_id} closed, cancelling scheduled fetch");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
        if *stop.borrow() {
            return;
        }
    }
}

/// Owner of a running poll task and reader of the view it publishes.
pub struct PollHandle {
    job_id: String,
    view: watch::Receiver<ResultsView>,
    stop: watch::Sender<bool>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn current(&self) -> ResultsView {
        self.view.borrow().clone()
    }

    /// Waits for the next view change. Returns `None` once the task has
    /// finished and nothing more will be published.
    pub async fn changed(&mut self) -> Option<ResultsView> {
        self.view.changed().await.ok()?;
        Some(self.view.borrow_and_update().clone())
    }

    /// Cancels any scheduled fetch. Also happens on drop.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
