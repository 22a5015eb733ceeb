use crate::models::JobStatus;
use crate::polling::ResultsView;
use crate::render::{
    format_match_rate, format_project_score, format_timestamp, in_progress_caption,
    FAILURE_FALLBACK,
};

/// One terminal-friendly block per view state.
pub fn describe(view: &ResultsView) -> String {
    match view {
        ResultsView::Loading => "Loading evaluation results...".to_string(),
        ResultsView::Error { message } => format!("Error loading results: {message}"),
        ResultsView::Job { job, progress } => match job.status {
            JobStatus::Queued | JobStatus::Processing => format!(
                "[{}] {} {}%",
                job.status.label(),
                in_progress_caption(job.status),
                progress
            ),
            JobStatus::Failed => format!(
                "[Failed] Evaluation failed: {}",
                job.failure_message().unwrap_or(FAILURE_FALLBACK)
            ),
            JobStatus::Completed => {
                let Some(result) = job.completed_result() else {
                    return "[Completed] No result was returned".to_string();
                };
                let completed_at = job
                    .completed_at
                    .as_deref()
                    .map(format_timestamp)
                    .unwrap_or_else(|| "N/A".to_string());
                format!(
                    "[Completed] {progress}%\n\
                     Overall: {}\n\
                     CV match rate: {}\n\
                     CV feedback: {}\n\
                     Project score: {}/5.00\n\
                     Project feedback: {}\n\
                     Job {} created {} completed {}",
                    result.overall_summary,
                    format_match_rate(result.cv_match_rate),
                    result.cv_feedback,
                    format_project_score(result.project_score),
                    result.project_feedback,
                    job.id,
                    format_timestamp(&job.created_at),
                    completed_at,
                )
            }
        },
    }
}
