pub mod document;
pub mod evaluation;

pub use document::{DocumentRef, EvaluateRequest, EvaluateResponse, UploadRequest, UploadResponse};
pub use evaluation::{EvaluationJob, EvaluationResult, JobStatus};
