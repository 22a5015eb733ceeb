use serde::{Deserialize, Serialize};

/// Lifecycle of an evaluation job as reported by the backend.
/// Transitions are forward-only: queued → processing → completed | failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Processing => "Processing",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    /// Fraction in [0, 1].
    pub cv_match_rate: f64,
    pub cv_feedback: String,
    /// Nominally in [0, 5].
    pub project_score: f64,
    pub project_feedback: String,
    pub overall_summary: String,
}

/// Read-only snapshot of a job, fetched fresh on every poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl EvaluationJob {
    /// The result, only when the job has completed.
    pub fn completed_result(&self) -> Option<&EvaluationResult> {
        match self.status {
            JobStatus::Completed => self.result.as_ref(),
            _ => None,
        }
    }

    /// The backend-supplied failure message, only when the job has failed.
    pub fn failure_message(&self) -> Option<&str> {
        match self.status {
            JobStatus::Failed => self
                .error_message
                .as_deref()
                .filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }
}
