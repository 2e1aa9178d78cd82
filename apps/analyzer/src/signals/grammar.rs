//! Grammar checker: client for a running LanguageTool server.
//!
//! Never fails the pipeline: any problem becomes the `errors_count = -1`
//! sentinel with the error message attached.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{GrammarReport, SignalError};

/// At most this many matches are quoted in the report.
pub const MAX_SAMPLE_ERRORS: usize = 10;
/// Match messages are cut to this many characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// One issue reported by the grammar service.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarMatch {
    pub rule_id: String,
    pub message: String,
    pub offset: usize,
    pub length: usize,
}

#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>, SignalError>;
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    message: String,
    #[serde(default)]
    offset: usize,
    #[serde(default)]
    length: usize,
    rule: RawRule,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    id: String,
}

/// LanguageTool HTTP API client (`POST {base_url}/v2/check`).
#[derive(Clone)]
pub struct LanguageToolClient {
    client: Client,
    base_url: String,
    language: String,
}

impl LanguageToolClient {
    pub fn new(base_url: &str, language: &str, timeout: Duration) -> Result<Self, SignalError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        })
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>, SignalError> {
        let response = self
            .client
            .post(format!("{}/v2/check", self.base_url))
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SignalError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: CheckResponse = response
            .json()
            .await
            .map_err(|e| SignalError::Malformed(e.to_string()))?;

        debug!("Grammar service returned {} match(es)", parsed.matches.len());
        Ok(parsed
            .matches
            .into_iter()
            .map(|m| GrammarMatch {
                rule_id: m.rule.id,
                message: m.message,
                offset: m.offset,
                length: m.length,
            })
            .collect())
    }
}

/// Runs the checker if one is available and folds the outcome into a report.
pub async fn grammar_check(checker: Option<&dyn GrammarChecker>, text: &str) -> GrammarReport {
    let Some(checker) = checker else {
        return GrammarReport::unavailable("grammar service not configured");
    };

    match checker.check(text).await {
        Ok(matches) => report_from_matches(&matches),
        Err(e) => {
            warn!("Grammar check unavailable: {e}");
            GrammarReport::unavailable(e.to_string())
        }
    }
}

fn report_from_matches(matches: &[GrammarMatch]) -> GrammarReport {
    GrammarReport {
        errors_count: matches.len() as i64,
        sample_errors: matches
            .iter()
            .take(MAX_SAMPLE_ERRORS)
            .map(|m| {
                let message: String = m.message.chars().take(MAX_MESSAGE_CHARS).collect();
                format!("{} | {}", m.rule_id, message)
            })
            .collect(),
        error: None,
    }
}
