//! Feedback synthesizer.
//!
//! Two strategies: `Generative` (hosted LLM) is tried first when a backend is
//! configured; `Deterministic` (rule-based) runs when it is absent or fails.
//! The chosen strategy, and the reason for any fallback, travel with the text.

pub mod deterministic;
pub mod prompts;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::GenerativeBackend;
use crate::signals::AnalysisRecord;

use self::deterministic::deterministic_feedback;
use self::prompts::build_review_prompt;

pub const NOT_CONFIGURED_REASON: &str = "Generative feedback backend not configured";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStrategy {
    Generative,
    Deterministic,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub text: String,
    pub strategy: FeedbackStrategy,
    /// Set when the deterministic strategy ran because the generative one
    /// could not.
    pub fallback_reason: Option<String>,
    pub analysis: AnalysisRecord,
}

#[derive(Clone, Default)]
pub struct FeedbackSynthesizer {
    generative: Option<Arc<dyn GenerativeBackend>>,
}

impl FeedbackSynthesizer {
    pub fn new(generative: Option<Arc<dyn GenerativeBackend>>) -> Self {
        Self { generative }
    }

    /// `job_description` is `None` when the caller supplied none (or only
    /// whitespace).
    pub async fn synthesize(
        &self,
        resume_text: &str,
        analysis: &AnalysisRecord,
        job_description: Option<&str>,
    ) -> Feedback {
        let job_supplied = job_description.is_some();

        let Some(backend) = &self.generative else {
            warn!("{NOT_CONFIGURED_REASON}; using deterministic feedback");
            return Feedback {
                text: format!(
                    "{NOT_CONFIGURED_REASON}; using fallback suggestions:\n\n{}",
                    deterministic_feedback(analysis, job_supplied)
                ),
                strategy: FeedbackStrategy::Deterministic,
                fallback_reason: Some(NOT_CONFIGURED_REASON.to_string()),
                analysis: analysis.clone(),
            };
        };

        let prompt = build_review_prompt(resume_text, analysis, job_description);
        match backend.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                info!("Feedback generated by model {}", backend.model());
                Feedback {
                    text,
                    strategy: FeedbackStrategy::Generative,
                    fallback_reason: None,
                    analysis: analysis.clone(),
                }
            }
            Ok(_) => fallback(analysis, job_supplied, "model returned empty text".to_string()),
            Err(e) => fallback(analysis, job_supplied, e.to_string()),
        }
    }
}

fn fallback(analysis: &AnalysisRecord, job_supplied: bool, reason: String) -> Feedback {
    warn!("Generative feedback failed ({reason}); using deterministic feedback");
    Feedback {
        text: format!(
            "Generative feedback request failed: {reason}\n\nFallback suggestions:\n{}",
            deterministic_feedback(analysis, job_supplied)
        ),
        strategy: FeedbackStrategy::Deterministic,
        fallback_reason: Some(reason),
        analysis: analysis.clone(),
    }
}
