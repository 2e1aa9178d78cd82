use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::feedback::{Feedback, FeedbackStrategy};
use crate::signals::AnalysisRecord;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub feedback: String,
    pub strategy: FeedbackStrategy,
    pub fallback_reason: Option<String>,
    pub analysis: AnalysisRecord,
}

impl From<Feedback> for AnalyzeResponse {
    fn from(f: Feedback) -> Self {
        Self {
            feedback: f.text,
            strategy: f.strategy,
            fallback_reason: f.fallback_reason,
            analysis: f.analysis,
        }
    }
}

/// The multipart form both analyze routes accept.
struct AnalyzeForm {
    file_name: String,
    resume: Bytes,
    job_description: Option<String>,
}

/// Multipart fields:
/// - `resume`: the resume file (required; `.pdf`, `.docx` or `.txt`)
/// - `job_description`: plain text (optional)
async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("resume") => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Read error: {e}")))?;
                resume = Some((file_name, bytes));
            }
            Some("job_description") => {
                job_description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, resume) = resume
        .ok_or_else(|| AppError::Validation("Missing 'resume' file in multipart form".to_string()))?;
    if resume.is_empty() {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }
    Ok(AnalyzeForm {
        file_name,
        resume,
        job_description,
    })
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_form(multipart).await?;
    let upload = state.uploads.save(&form.file_name, &form.resume).await?;
    info!("Analyzing upload {} ({} bytes)", upload.name(), form.resume.len());

    let result = state
        .analyzer
        .analyze(upload.path(), form.job_description.as_deref())
        .await;
    upload.discard().await?;
    Ok(Json(result?.into()))
}

/// POST /api/v1/analyze/text
///
/// Same form; answers `text/plain` with the feedback, or with a message
/// starting `Error:` when the analysis could not run.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<String, AppError> {
    let form = read_form(multipart).await?;
    let upload = state.uploads.save(&form.file_name, &form.resume).await?;
    info!("Analyzing upload {} as text ({} bytes)", upload.name(), form.resume.len());

    let message = state
        .analyzer
        .analyze_to_message(upload.path(), form.job_description.as_deref())
        .await;
    upload.discard().await?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use crate::capabilities::Capabilities;
    use crate::extraction::{Extractor, OcrConfig};
    use crate::feedback::FeedbackSynthesizer;
    use crate::pipeline::Analyzer;
    use crate::routes::build_router;
    use crate::signals::SignalExtractors;
    use crate::state::AppState;
    use crate::uploads::UploadStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XyZresumeBoundary";

    fn caps() -> Capabilities {
        Capabilities {
            pdf_text: true,
            docx: true,
            ocr_renderer: false,
            ocr_engine: false,
            grammar: false,
            embedding: false,
            generative: false,
        }
    }

    async fn state(dir: &tempfile::TempDir, credential: bool) -> AppState {
        let ocr = OcrConfig::new(
            "pdftoppm".to_string(),
            "tesseract".to_string(),
            Duration::from_secs(5),
        );
        AppState {
            analyzer: Analyzer::new(
                credential,
                Extractor::new(&caps(), ocr),
                SignalExtractors::default(),
                FeedbackSynthesizer::default(),
            ),
            uploads: UploadStore::open(dir.path()).await.unwrap(),
            capabilities: caps(),
        }
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn analyze_request(body: String) -> Request<Body> {
        post("/api/v1/analyze", body)
    }

    fn post(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn uploads_left(dir: &tempfile::TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_analyze_returns_feedback_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&dir, true).await);
        let body = multipart_body(&[
            ("resume", Some("cv.txt"), "Summary\nSkills: Rust\n- Built a compiler\n"),
            ("job_description", None, "Rust compiler engineer"),
        ]);

        let response = app.oneshot(analyze_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["strategy"], "deterministic");
        assert!(json["feedback"].as_str().unwrap().contains("1. "));
        assert_eq!(json["analysis"]["bullet_count"], 1);
        assert!(json["fallback_reason"].is_string());
        assert_eq!(uploads_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_missing_resume_part_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&dir, true).await);
        let body = multipart_body(&[("job_description", None, "Rust")]);

        let response = app.oneshot(analyze_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_fatal_pipeline_error_is_422_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&dir, true).await);
        let body = multipart_body(&[("resume", Some("blank.txt"), "   \n  ")]);

        let response = app.oneshot(analyze_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(
            json["error"]["message"],
            "Error: Could not extract any text from the resume."
        );
        assert_eq!(uploads_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_is_422() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&dir, false).await);
        let body = multipart_body(&[("resume", Some("cv.txt"), "Summary")]);

        let response = app.oneshot(analyze_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "Error: GEMINI_API_KEY not configured.");
    }

    #[tokio::test]
    async fn test_health_reports_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&dir, true).await);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["capabilities"]["docx"], true);
        assert_eq!(json["capabilities"]["ocr_engine"], false);
    }

    #[tokio::test]
    async fn test_text_route_returns_feedback_as_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&dir, true).await);
        let body = multipart_body(&[("resume", Some("cv.txt"), "Summary\nSkills: Rust\n")]);

        let response = app.oneshot(post("/api/v1/analyze/text", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("\n\n1. "), "got {text:?}");
        assert_eq!(uploads_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_text_route_renders_fatal_error_as_message() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&dir, false).await);
        let body = multipart_body(&[("resume", Some("cv.txt"), "Summary")]);

        let response = app.oneshot(post("/api/v1/analyze/text", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Error: GEMINI_API_KEY not configured.");
        assert_eq!(uploads_left(&dir), 0);
    }
}
