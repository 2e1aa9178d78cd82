//! Semantic similarity and keyword coverage against a job description.
//!
//! Coverage counts a job keyword as present when it occurs anywhere in the
//! lower-cased resume, including inside longer words ("java" in
//! "javascript"). That over-counts and is a known precision limitation.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use super::embedding::EmbeddingModel;
use super::{KeywordMatch, SignalError};

pub const MODEL_NOT_LOADED: &str = "Embedding model not loaded.";

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Za-z0-9+#\-_]+\b").expect("valid keyword regex"))
}

/// Deduplicated, lower-cased job keywords longer than two characters.
pub fn job_keywords(job_text: &str) -> BTreeSet<String> {
    keyword_re()
        .find_iter(job_text)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Percentage of `keywords` found as substrings of the lower-cased resume.
/// 0.0 when there are no keywords.
pub fn keyword_coverage(resume_text: &str, keywords: &BTreeSet<String>) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let resume = resume_text.to_lowercase();
    let present = keywords.iter().filter(|k| resume.contains(k.as_str())).count();
    present as f64 / keywords.len() as f64 * 100.0
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SignalError> {
    if a.len() != b.len() {
        return Err(SignalError::Malformed(format!(
            "embedding dimension mismatch: {} != {}",
            a.len(),
            b.len()
        )));
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Computes the keyword-match signal. Any failure, including a missing model,
/// produces the `semantic_similarity = -1.0` sentinel.
pub async fn compute_keyword_match(
    resume_text: &str,
    job_text: &str,
    model: Option<&dyn EmbeddingModel>,
) -> KeywordMatch {
    let Some(model) = model else {
        return KeywordMatch::unavailable(MODEL_NOT_LOADED);
    };

    // Nothing to compare against; the model is not consulted.
    if job_text.trim().is_empty() {
        return KeywordMatch {
            semantic_similarity: 0.0,
            keyword_coverage_percent: 0.0,
            job_keyword_count: 0,
            error: None,
        };
    }

    match try_keyword_match(resume_text, job_text, model).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Keyword match unavailable ({}): {e}", model.name());
            KeywordMatch::unavailable(e.to_string())
        }
    }
}

async fn try_keyword_match(
    resume_text: &str,
    job_text: &str,
    model: &dyn EmbeddingModel,
) -> Result<KeywordMatch, SignalError> {
    let resume_vec = model.encode(resume_text).await?;
    let job_vec = model.encode(job_text).await?;
    let semantic_similarity = cosine_similarity(&resume_vec, &job_vec)?;

    let keywords = job_keywords(job_text);
    Ok(KeywordMatch {
        semantic_similarity,
        keyword_coverage_percent: keyword_coverage(resume_text, &keywords),
        job_keyword_count: keywords.len(),
        error: None,
    })
}
