use serde::{Deserialize, Serialize};

/// Body of `POST {base}/upload`: both documents as plain base64 (no data-URI prefix).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRequest {
    pub cv_base64: String,
    pub project_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: String,
}

/// Only the identifiers are kept; any extra metadata the backend returns is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub cv_document: DocumentRef,
    pub project_document: DocumentRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluateRequest {
    pub job_title: String,
    pub cv_document_id: String,
    pub project_document_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub id: String,
}
