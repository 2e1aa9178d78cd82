mod capabilities;
mod config;
mod errors;
mod extraction;
mod feedback;
mod llm_client;
mod normalize;
mod pipeline;
mod routes;
mod signals;
mod state;
mod uploads;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::capabilities::{detect_executable, Capabilities};
use crate::config::Config;
use crate::extraction::{Extractor, OcrConfig};
use crate::feedback::FeedbackSynthesizer;
use crate::llm_client::{GeminiClient, GenerativeBackend};
use crate::pipeline::Analyzer;
use crate::routes::build_router;
use crate::signals::embedding::{EmbeddingModel, OllamaEmbedder};
use crate::signals::grammar::{GrammarChecker, LanguageToolClient};
use crate::signals::SignalExtractors;
use crate::state::AppState;
use crate::uploads::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analyzer v{}", env!("CARGO_PKG_VERSION"));

    // OCR executables
    let ocr_renderer = detect_executable(&config.ocr_renderer_path, "-v").await;
    let ocr_engine = detect_executable(&config.ocr_engine_path, "--version").await;

    let grammar = build_grammar_checker(&config);
    let embedding = load_embedding_model(&config).await;
    let generative = build_generative_backend(&config);

    let capabilities = Capabilities {
        pdf_text: true,
        docx: true,
        ocr_renderer,
        ocr_engine,
        grammar: grammar.is_some(),
        embedding: embedding.is_some(),
        generative: generative.is_some(),
    };
    capabilities.log_summary();

    let ocr = OcrConfig::new(
        config.ocr_renderer_path.clone(),
        config.ocr_engine_path.clone(),
        config.ocr_timeout,
    );
    let analyzer = Analyzer::new(
        config.generative_api_key.is_some(),
        Extractor::new(&capabilities, ocr),
        SignalExtractors::new(grammar, embedding),
        FeedbackSynthesizer::new(generative),
    );

    let uploads = UploadStore::open(&config.upload_dir).await?;
    info!("Uploads stored under {}", uploads.dir().display());

    let state = AppState {
        analyzer,
        uploads,
        capabilities,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_grammar_checker(config: &Config) -> Option<Arc<dyn GrammarChecker>> {
    let Some(url) = &config.grammar_server_url else {
        info!("Grammar checking disabled (GRAMMAR_SERVER_URL is empty)");
        return None;
    };
    match LanguageToolClient::new(url, &config.grammar_language, config.http_timeout) {
        Ok(client) => {
            info!("Grammar checker initialized ({url}, {})", config.grammar_language);
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("Grammar checker unavailable: {e}");
            None
        }
    }
}

/// Loaded once; a failure here marks the embedding model unavailable for
/// the life of the process.
async fn load_embedding_model(config: &Config) -> Option<Arc<dyn EmbeddingModel>> {
    let Some(url) = &config.embedding_server_url else {
        info!("Embedding model disabled (EMBEDDING_SERVER_URL is empty)");
        return None;
    };
    match OllamaEmbedder::load(url, &config.embedding_model, config.http_timeout).await {
        Ok(model) => Some(Arc::new(model)),
        Err(e) => {
            warn!(
                "Embedding model '{}' could not be loaded: {e}",
                config.embedding_model
            );
            None
        }
    }
}

fn build_generative_backend(config: &Config) -> Option<Arc<dyn GenerativeBackend>> {
    let Some(key) = &config.generative_api_key else {
        warn!("GEMINI_API_KEY not set; every analysis will be refused");
        return None;
    };
    match GeminiClient::new(
        key.clone(),
        &config.generative_api_url,
        &config.generative_model,
        config.http_timeout,
    ) {
        Ok(client) => {
            info!("LLM client initialized (model: {})", config.generative_model);
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("LLM client could not be built: {e}");
            None
        }
    }
}
