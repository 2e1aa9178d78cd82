//! Sentence-embedding model handle.
//!
//! The model is loaded once at startup and shared read-only as
//! `Arc<dyn EmbeddingModel>`. A failed load leaves the handle empty; the
//! keyword matcher then reports its sentinel for every request.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::SignalError;

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    fn name(&self) -> &str;

    async fn encode(&self, text: &str) -> Result<Vec<f32>, SignalError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding model served by a local Ollama instance (`POST /api/embed`).
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// Connects to the server and encodes a warm-up sentence. Succeeds only if
    /// the model is actually servable, so callers can record it as available.
    pub async fn load(base_url: &str, model: &str, timeout: Duration) -> Result<Self, SignalError> {
        let start = Instant::now();
        let mut embedder = Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension: 0,
        };

        let warm_up = embedder.embed("resume analyzer warm-up").await?;
        if warm_up.is_empty() {
            return Err(SignalError::Malformed(
                "embedding server returned an empty vector".to_string(),
            ));
        }
        embedder.dimension = warm_up.len();

        info!(
            "Embedding model '{}' loaded: dimension={}, {}ms",
            embedder.model,
            embedder.dimension,
            start.elapsed().as_millis()
        );
        Ok(embedder)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SignalError> {
        let request = EmbedRequest {
            model: &self.model,
            input: vec![text],
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request)
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

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| SignalError::Malformed(e.to_string()))?;

        let vector = result
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SignalError::Malformed("no embedding in response".to_string()))?;
        debug!("Encoded {} chars into {} dims", text.len(), vector.len());
        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>, SignalError> {
        let vector = self.embed(text).await?;
        if self.dimension != 0 && vector.len() != self.dimension {
            return Err(SignalError::Malformed(format!(
                "expected {} dims, got {}",
                self.dimension,
                vector.len()
            )));
        }
        Ok(vector)
    }
}
