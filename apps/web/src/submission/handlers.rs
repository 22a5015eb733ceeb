use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::backend_client::BackendError;
use crate::errors::AppError;
use crate::polling::handlers::results_path;
use crate::render::HomePage;
use crate::state::AppState;
use crate::submission::{Document, SubmissionForm, SubmitError};

/// GET /
pub async fn handle_home() -> Result<Html<String>, AppError> {
    Ok(Html(HomePage::blank().render()?))
}

/// POST /submit
///
/// Runs the submission flow and redirects to the results view. On any failure
/// the form is rendered again with the message so it can be re-submitted.
pub async fn handle_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            debug!("rejecting malformed submission: {e}");
            return form_page(
                StatusCode::BAD_REQUEST,
                String::new(),
                format!("Malformed form data: {e}"),
            );
        }
    };
    let job_title = form.job_title.clone();

    let submitted = state.submission.submit(form).await.and_then(|job_id| {
        results_path(&job_id)
            .ok_or_else(|| SubmitError::EvaluationStart(BackendError::InvalidUrl(job_id)))
    });
    match submitted {
        Ok(path) => Ok(Redirect::to(&path).into_response()),
        Err(e) => {
            let status = if e.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            form_page(status, job_title, e.to_string())
        }
    }
}

fn form_page(status: StatusCode, job_title: String, error: String) -> Result<Response, AppError> {
    let page = HomePage { job_title, error };
    Ok((status, Html(page.render()?)).into_response())
}

/// Collects `job_title`, `cv` and `project` parts. An empty file part (no file
/// chosen in the browser) counts as missing.
async fn read_form(mut multipart: Multipart) -> Result<SubmissionForm, MultipartError> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        match name.as_str() {
            "job_title" => form.job_title = String::from_utf8_lossy(&bytes).into_owned(),
            "cv" | "project" => {
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let doc = Some(Document::new(file_name, bytes));
                if name == "cv" {
                    form.cv = doc;
                } else {
                    form.project = doc;
                }
            }
            other => debug!("ignoring unexpected form field '{other}'"),
        }
    }

    Ok(form)
}
