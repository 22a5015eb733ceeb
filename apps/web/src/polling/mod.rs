//! Status polling: fetch a job snapshot, show it, and re-fetch on a fixed
//! interval until the job reaches a terminal state.
//!
//! The displayed progress is a fixed heuristic per status, not a backend signal.

pub mod handlers;
pub mod task;

use crate::models::{EvaluationJob, JobStatus};

pub use task::{PollHandle, ResultsPoller};

pub const QUEUED_PROGRESS: u8 = 30;
pub const PROCESSING_PROGRESS: u8 = 70;
pub const COMPLETED_PROGRESS: u8 = 100;

pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch results";

/// What the results view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// Nothing fetched yet.
    Loading,
    Job { job: EvaluationJob, progress: u8 },
    /// The status fetch itself failed. Distinct from a job that failed.
    Error { message: String },
}

impl ResultsView {
    /// No further fetch follows a terminal view.
    pub fn is_terminal(&self) -> bool {
        match self {
            ResultsView::Loading => false,
            ResultsView::Job { job, .. } => job.status.is_terminal(),
            ResultsView::Error { .. } => true,
        }
    }

    pub fn progress(&self) -> u8 {
        match self {
            ResultsView::Job { progress, .. } => *progress,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Schedule exactly one more fetch after the interval.
    Refetch,
    Stop,
}

/// Applies one snapshot to the view. A failed job keeps whatever progress was
/// last displayed.
pub fn advance(job: EvaluationJob, previous_progress: u8) -> (ResultsView, PollStep) {
    let (progress, step) = match job.status {
        JobStatus::Queued => (QUEUED_PROGRESS, PollStep::Refetch),
        JobStatus::Processing => (PROCESSING_PROGRESS, PollStep::Refetch),
        JobStatus::Completed => (COMPLETED_PROGRESS, PollStep::Stop),
        JobStatus::Failed => (previous_progress, PollStep::Stop),
    };
    (ResultsView::Job { job, progress }, step)
}
