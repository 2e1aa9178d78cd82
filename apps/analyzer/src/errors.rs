use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Fatal pipeline errors. Anything not listed here is absorbed into the
/// `AnalysisRecord` as a sentinel value or triggers the feedback fallback.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0} not configured.")]
    Configuration(String),

    #[error("Unsupported file type for {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("Could not extract any text from the resume.")]
    EmptyExtractionResult,
}

impl AnalysisError {
    /// String form handed across the pipeline boundary. Callers distinguish
    /// failures from feedback by the `Error:` prefix.
    pub fn to_message(&self) -> String {
        format!("Error: {self}")
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ANALYSIS_ERROR",
                e.to_message(),
            ),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "The upload could not be stored".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
