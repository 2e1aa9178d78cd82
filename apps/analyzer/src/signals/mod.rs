//! Signal extractors: independent measurements of a resume.
//!
//! Each extractor fills exactly one field of the `AnalysisRecord`. Failures
//! never propagate: a backend that is missing or errors out leaves a sentinel
//! value (and its error message) in the record instead.

pub mod action_verbs;
pub mod embedding;
pub mod grammar;
pub mod keywords;
pub mod sections;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::normalize::word_count;

use self::action_verbs::count_action_verbs;
use self::embedding::EmbeddingModel;
use self::grammar::{grammar_check, GrammarChecker};
use self::keywords::compute_keyword_match;
use self::sections::{count_bullets, detect_missing_sections};

/// Non-fatal: recorded as a sentinel, never returned to the pipeline caller.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarReport {
    /// `-1` when the grammar service could not be used.
    pub errors_count: i64,
    pub sample_errors: Vec<String>,
    pub error: Option<String>,
}

impl GrammarReport {
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            errors_count: -1,
            sample_errors: vec![],
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// Cosine similarity in [-1, 1]; exactly `-1.0` with `error` set means
    /// the model was unavailable.
    pub semantic_similarity: f64,
    pub keyword_coverage_percent: f64,
    pub job_keyword_count: usize,
    pub error: Option<String>,
}

impl KeywordMatch {
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            semantic_similarity: -1.0,
            keyword_coverage_percent: 0.0,
            job_keyword_count: 0,
            error: Some(error.into()),
        }
    }
}

/// Every signal for one resume. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub word_count: usize,
    pub action_verb_count: usize,
    pub missing_sections: Vec<String>,
    /// Bullet lines counted before normalization flattened the text.
    pub bullet_count: usize,
    pub grammar: GrammarReport,
    pub keyword_match: KeywordMatch,
}

/// The optional remote/model-backed extractors, injected at startup.
#[derive(Clone, Default)]
pub struct SignalExtractors {
    pub grammar: Option<Arc<dyn GrammarChecker>>,
    pub embedding: Option<Arc<dyn EmbeddingModel>>,
}

impl SignalExtractors {
    pub fn new(
        grammar: Option<Arc<dyn GrammarChecker>>,
        embedding: Option<Arc<dyn EmbeddingModel>>,
    ) -> Self {
        Self { grammar, embedding }
    }

    /// Runs every extractor in turn. `raw_text` is the extractor output before
    /// normalization; `text` is the normalized form used for everything else.
    pub async fn analyze(&self, raw_text: &str, text: &str, job_description: &str) -> AnalysisRecord {
        let grammar = grammar_check(self.grammar.as_deref(), text).await;
        let keyword_match =
            compute_keyword_match(text, job_description, self.embedding.as_deref()).await;

        let record = AnalysisRecord {
            word_count: word_count(text),
            action_verb_count: count_action_verbs(text),
            missing_sections: detect_missing_sections(text),
            bullet_count: count_bullets(raw_text),
            grammar,
            keyword_match,
        };

        info!(
            words = record.word_count,
            action_verbs = record.action_verb_count,
            missing_sections = record.missing_sections.len(),
            grammar_errors = record.grammar.errors_count,
            keyword_coverage = record.keyword_match.keyword_coverage_percent,
            "Signals extracted"
        );
        record
    }
}
