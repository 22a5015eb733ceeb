//! Submission flow: job title + two PDFs → upload → evaluate → job id.
//!
//! The two backend calls are strictly sequential and never retried.
//! Any failure aborts the attempt and leaves the form re-submittable.

pub mod encoding;
pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend_client::{is_path_segment, BackendError, EvaluatorApi};
use crate::models::{EvaluateRequest, UploadRequest};
use encoding::encode_document;

/// The backend rejects longer titles.
pub const MAX_JOB_TITLE_CHARS: usize = 255;
/// Per-document ceiling enforced by the backend (10 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// A document picked by the user. Content is dropped once submitted.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read document '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Everything the submission form collects. Missing inputs are `None`/empty.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub job_title: String,
    pub cv: Option<Document>,
    pub project: Option<Document>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please fill in all fields and upload both documents")]
    MissingInput,

    #[error("Job title must be at most {MAX_JOB_TITLE_CHARS} characters")]
    JobTitleTooLong,

    #[error("{0} exceeds the maximum document size of {MAX_DOCUMENT_BYTES} bytes")]
    DocumentTooLarge(String),

    #[error("Failed to upload documents")]
    Upload(#[source] BackendError),

    #[error("Failed to start evaluation")]
    EvaluationStart(#[source] BackendError),
}

impl SubmitError {
    /// Local validation failures are detected before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SubmitError::MissingInput
                | SubmitError::JobTitleTooLong
                | SubmitError::DocumentTooLarge(_)
        )
    }
}

/// A form that passed local validation.
struct ValidSubmission {
    job_title: String,
    cv: Document,
    project: Document,
}

fn validate(form: SubmissionForm) -> Result<ValidSubmission, SubmitError> {
    let job_title = form.job_title.trim().to_string();
    let (cv, project) = match (job_title.is_empty(), form.cv, form.project) {
        (false, Some(cv), Some(project)) => (cv, project),
        _ => return Err(SubmitError::MissingInput),
    };

    if job_title.chars().count() > MAX_JOB_TITLE_CHARS {
        return Err(SubmitError::JobTitleTooLong);
    }
    for doc in [&cv, &project] {
        if doc.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(SubmitError::DocumentTooLarge(doc.file_name.clone()));
        }
    }

    Ok(ValidSubmission {
        job_title,
        cv,
        project,
    })
}

#[derive(Clone)]
pub struct SubmissionFlow {
    api: Arc<dyn EvaluatorApi>,
}

impl SubmissionFlow {
    pub fn new(api: Arc<dyn EvaluatorApi>) -> Self {
        Self { api }
    }

    /// Runs validate → upload → evaluate and returns the new job id.
    pub async fn submit(&self, form: SubmissionForm) -> Result<String, SubmitError> {
        let submission = validate(form)?;

        let upload = UploadRequest {
            cv_base64: encode_document(&submission.cv.bytes),
            project_base64: encode_document(&submission.project.bytes),
        };
        // The documents are not needed past this point.
        drop(submission.cv);
        drop(submission.project);

        let uploaded = self.api.upload(&upload).await.map_err(|e| {
            warn!("document upload failed: {e}");
            SubmitError::Upload(e)
        })?;
        drop(upload);

        let evaluate = EvaluateRequest {
            job_title: submission.job_title,
            cv_document_id: uploaded.cv_document.id,
            project_document_id: uploaded.project_document.id,
        };
        let job = self.api.evaluate(&evaluate).await.map_err(|e| {
            warn!("evaluation start failed: {e}");
            SubmitError::EvaluationStart(e)
        })?;
        if !is_path_segment(&job.id) {
            warn!("backend returned an unusable job id '{}'", job.id);
            return Err(SubmitError::EvaluationStart(BackendError::InvalidUrl(
                format!("unusable job id '{}'", job.id),
            )));
        }

        info!(
            "evaluation job {} started for '{}'",
            job.id, evaluate.job_title
        );
        Ok(job.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentRef, EvaluateResponse, EvaluationJob, UploadResponse};
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Upload(UploadRequest),
        Evaluate(EvaluateRequest),
    }

    /// Records every call in order and answers from fixed outcomes.
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<Call>>,
        fail_upload: bool,
        fail_evaluate: bool,
        /// Id handed out by `evaluate`, `job-42` when unset.
        job_id: Option<String>,
    }

    #[async_trait]
    impl EvaluatorApi for RecordingApi {
        async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, BackendError> {
            self.calls.lock().unwrap().push(Call::Upload(request.clone()));
            if self.fail_upload {
                return Err(BackendError::Status {
                    status: 500,
                    body: "disk full".into(),
                });
            }
            Ok(UploadResponse {
                cv_document: DocumentRef { id: "c1".into() },
                project_document: DocumentRef { id: "p1".into() },
            })
        }

        async fn evaluate(
            &self,
            request: &EvaluateRequest,
        ) -> Result<EvaluateResponse, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Evaluate(request.clone()));
            if self.fail_evaluate {
                return Err(BackendError::Status {
                    status: 404,
                    body: "document not found".into(),
                });
            }
            Ok(EvaluateResponse {
                id: self.job_id.clone().unwrap_or_else(|| "job-42".into()),
            })
        }

        async fn fetch_job(&self, _job_id: &str) -> Result<EvaluationJob, BackendError> {
            unreachable!("submission never polls")
        }
    }

    fn form() -> SubmissionForm {
        SubmissionForm {
            job_title: "Backend Engineer".into(),
            cv: Some(Document::new("cv.pdf", b"%PDF-cv".to_vec())),
            project: Some(Document::new("project.pdf", b"%PDF-project".to_vec())),
        }
    }

    fn flow(api: &Arc<RecordingApi>) -> SubmissionFlow {
        SubmissionFlow::new(api.clone())
    }

    #[tokio::test]
    async fn test_upload_then_evaluate_in_order() {
        let api = Arc::new(RecordingApi::default());
        let job_id = flow(&api).submit(form()).await.unwrap();
        assert_eq!(job_id, "job-42");

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            Call::Upload(req) => {
                assert_eq!(STANDARD.decode(&req.cv_base64).unwrap(), b"%PDF-cv");
                assert_eq!(STANDARD.decode(&req.project_base64).unwrap(), b"%PDF-project");
            }
            other => panic!("expected upload first, got {other:?}"),
        }
        assert_eq!(
            calls[1],
            Call::Evaluate(EvaluateRequest {
                job_title: "Backend Engineer".into(),
                cv_document_id: "c1".into(),
                project_document_id: "p1".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_missing_inputs_make_no_calls() {
        let cases = [
            SubmissionForm {
                job_title: "".into(),
                ..form()
            },
            SubmissionForm {
                job_title: "   ".into(),
                ..form()
            },
            SubmissionForm {
                cv: None,
                ..form()
            },
            SubmissionForm {
                project: None,
                ..form()
            },
        ];
        for case in cases {
            let api = Arc::new(RecordingApi::default());
            let err = flow(&api).submit(case).await.unwrap_err();
            assert!(matches!(err, SubmitError::MissingInput));
            assert!(err.is_validation());
            assert!(api.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_overlong_title_and_large_document_are_local_errors() {
        let api = Arc::new(RecordingApi::default());
        let long_title = SubmissionForm {
            job_title: "x".repeat(MAX_JOB_TITLE_CHARS + 1),
            ..form()
        };
        assert!(matches!(
            flow(&api).submit(long_title).await,
            Err(SubmitError::JobTitleTooLong)
        ));

        let big = SubmissionForm {
            cv: Some(Document::new("huge.pdf", vec![0u8; MAX_DOCUMENT_BYTES + 1])),
            ..form()
        };
        match flow(&api).submit(big).await {
            Err(SubmitError::DocumentTooLarge(name)) => assert_eq!(name, "huge.pdf"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_skips_evaluate() {
        let api = Arc::new(RecordingApi {
            fail_upload: true,
            ..Default::default()
        });
        let err = flow(&api).submit(form()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload documents");
        assert!(!err.is_validation());
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_failure_is_reported() {
        let api = Arc::new(RecordingApi {
            fail_evaluate: true,
            ..Default::default()
        });
        let err = flow(&api).submit(form()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to start evaluation");
        assert_eq!(api.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dot_segment_job_id_is_rejected() {
        let api = Arc::new(RecordingApi {
            job_id: Some("..".into()),
            ..Default::default()
        });
        let err = flow(&api).submit(form()).await.unwrap_err();
        assert!(matches!(err, SubmitError::EvaluationStart(_)));
        assert_eq!(api.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_job_title_is_trimmed() {
        let api = Arc::new(RecordingApi::default());
        let padded = SubmissionForm {
            job_title: "  Backend Engineer \n".into(),
            ..form()
        };
        flow(&api).submit(padded).await.unwrap();
        let calls = api.calls.lock().unwrap();
        assert!(matches!(
            &calls[1],
            Call::Evaluate(req) if req.job_title == "Backend Engineer"
        ));
    }

    #[tokio::test]
    async fn test_document_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, b"%PDF-1.4 body").unwrap();

        let doc = Document::from_path(&path).await.unwrap();
        assert_eq!(doc.file_name, "cv.pdf");
        assert_eq!(&doc.bytes[..], b"%PDF-1.4 body");

        assert!(Document::from_path(&dir.path().join("missing.pdf"))
            .await
            .is_err());
    }
}
