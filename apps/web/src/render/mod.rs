//! HTML views (askama) and the plain-text rendering used by the CLI.

pub mod text;

use askama::Template;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::JobStatus;
use crate::polling::ResultsView;

pub const FAILURE_FALLBACK: &str = "An error occurred during evaluation";

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub job_title: String,
    /// Empty when there is nothing to report.
    pub error: String,
}

impl HomePage {
    pub fn blank() -> Self {
        Self {
            job_title: String::new(),
            error: String::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsPage {
    pub job_id: String,
    /// Pre-rendered [`ResultsPanel`].
    pub panel: String,
}

/// Colour band for a score, from the thresholds used on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn for_match_rate(rate: f64) -> Self {
        if rate >= 0.8 {
            ScoreBand::Strong
        } else if rate >= 0.6 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }

    pub fn for_project_score(score: f64) -> Self {
        if score >= 4.0 {
            ScoreBand::Strong
        } else if score >= 3.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ScoreBand::Strong => "text-success",
            ScoreBand::Fair => "text-warning",
            ScoreBand::Weak => "text-destructive",
        }
    }
}

pub fn format_match_rate(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

pub fn format_project_score(score: f64) -> String {
    format!("{score:.2}")
}

/// Backend timestamps may or may not carry an offset. Naive ones are taken as
/// UTC. Anything unparseable is shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.and_utc().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    }
    raw.to_string()
}

fn percent_width(value: f64) -> u32 {
    value.clamp(0.0, 100.0).round() as u32
}

pub fn in_progress_caption(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "Waiting in queue...",
        _ => "Running AI evaluation pipeline...",
    }
}

#[derive(Template, Default)]
#[template(path = "results_panel.html")]
pub struct ResultsPanel {
    pub loading: bool,
    pub load_error: bool,
    pub error_message: String,

    pub status_label: String,
    pub in_progress: bool,
    pub progress: u8,
    pub progress_caption: String,

    pub failed: bool,
    pub failure_message: String,

    pub completed: bool,
    pub has_result: bool,
    pub overall_summary: String,
    pub match_rate: String,
    pub match_rate_width: u32,
    pub match_rate_class: String,
    pub cv_feedback: String,
    pub project_score: String,
    pub project_score_width: u32,
    pub project_score_class: String,
    pub project_feedback: String,

    pub job_id: String,
    pub created_at: String,
    pub completed_at: String,
}

impl ResultsPanel {
    pub fn from_view(view: &ResultsView) -> Self {
        match view {
            ResultsView::Loading => ResultsPanel {
                loading: true,
                ..Default::default()
            },
            ResultsView::Error { message } => ResultsPanel {
                load_error: true,
                error_message: message.clone(),
                ..Default::default()
            },
            ResultsView::Job { job, progress } => {
                let mut panel = ResultsPanel {
                    status_label: job.status.label().to_string(),
                    progress: *progress,
                    job_id: job.id.clone(),
                    created_at: format_timestamp(&job.created_at),
                    completed_at: job
                        .completed_at
                        .as_deref()
                        .map(format_timestamp)
                        .unwrap_or_else(|| "N/A".to_string()),
                    ..Default::default()
                };
                match job.status {
                    JobStatus::Queued | JobStatus::Processing => {
                        panel.in_progress = true;
                        panel.progress_caption = in_progress_caption(job.status).to_string();
                    }
                    JobStatus::Failed => {
                        panel.failed = true;
                        panel.failure_message = job
                            .failure_message()
                            .unwrap_or(FAILURE_FALLBACK)
                            .to_string();
                    }
                    JobStatus::Completed => {
                        panel.completed = true;
                        if let Some(result) = job.completed_result() {
                            let match_band = ScoreBand::for_match_rate(result.cv_match_rate);
                            let score_band = ScoreBand::for_project_score(result.project_score);
                            panel.has_result = true;
                            panel.overall_summary = result.overall_summary.clone();
                            panel.match_rate = format_match_rate(result.cv_match_rate);
                            panel.match_rate_width = percent_width(result.cv_match_rate * 100.0);
                            panel.match_rate_class = match_band.css_class().to_string();
                            panel.cv_feedback = result.cv_feedback.clone();
                            panel.project_score = format_project_score(result.project_score);
                            panel.project_score_width =
                                percent_width(result.project_score / 5.0 * 100.0);
                            panel.project_score_class = score_band.css_class().to_string();
                            panel.project_feedback = result.project_feedback.clone();
                        }
                    }
                }
                panel
            }
        }
    }
}
