//! Pipeline orchestrator: document path in, feedback out.

use std::path::Path;

use tracing::{info, instrument};

use crate::errors::AnalysisError;
use crate::extraction::{Document, Extractor};
use crate::feedback::{Feedback, FeedbackSynthesizer};
use crate::normalize::normalize;
use crate::signals::SignalExtractors;

pub const CREDENTIAL_NAME: &str = "GEMINI_API_KEY";

/// Everything one analysis needs. Cloned into each request; holds no
/// per-request state.
#[derive(Clone)]
pub struct Analyzer {
    credential_configured: bool,
    extractor: Extractor,
    signals: SignalExtractors,
    feedback: FeedbackSynthesizer,
}

impl Analyzer {
    pub fn new(
        credential_configured: bool,
        extractor: Extractor,
        signals: SignalExtractors,
        feedback: FeedbackSynthesizer,
    ) -> Self {
        Self {
            credential_configured,
            extractor,
            signals,
            feedback,
        }
    }

    /// Runs extraction, signals and synthesis in sequence. Only configuration
    /// and extraction problems are fatal; everything later degrades.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn analyze(
        &self,
        path: &Path,
        job_description: Option<&str>,
    ) -> Result<Feedback, AnalysisError> {
        if !self.credential_configured {
            return Err(AnalysisError::Configuration(CREDENTIAL_NAME.to_string()));
        }

        let document = Document::from_path(path)?;
        let raw_text = self.extractor.extract(&document).await?;
        let text = normalize(&raw_text);
        if text.is_empty() {
            return Err(AnalysisError::EmptyExtractionResult);
        }
        info!("Extracted {} chars from {:?} document", text.len(), document.format);

        let job = job_description.filter(|j| !j.trim().is_empty());
        let analysis = self
            .signals
            .analyze(&raw_text, &text, job.unwrap_or_default())
            .await;

        let feedback = self.feedback.synthesize(&text, &analysis, job).await;
        info!(strategy = ?feedback.strategy, "Analysis complete");
        Ok(feedback)
    }

    /// String boundary: feedback text, or `"Error: ..."` for a fatal error.
    pub async fn analyze_to_message(&self, path: &Path, job_description: Option<&str>) -> String {
        match self.analyze(path, job_description).await {
            Ok(feedback) => feedback.text,
            Err(e) => e.to_message(),
        }
    }
}
