use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every optional backend has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the generative feedback service. The pipeline refuses to
    /// run without it, but the process still starts.
    pub generative_api_key: Option<String>,
    pub generative_model: String,
    pub generative_api_url: String,
    pub ocr_renderer_path: String,
    pub ocr_engine_path: String,
    pub ocr_timeout: Duration,
    /// `None` disables grammar checking entirely.
    pub grammar_server_url: Option<String>,
    pub grammar_language: String,
    /// `None` disables the embedding model.
    pub embedding_server_url: Option<String>,
    pub embedding_model: String,
    pub http_timeout: Duration,
    pub upload_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            generative_api_key: optional_env("GEMINI_API_KEY"),
            generative_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            generative_api_url: env_or(
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            ocr_renderer_path: env_or("OCR_RENDERER_PATH", "pdftoppm"),
            ocr_engine_path: env_or("OCR_ENGINE_PATH", "tesseract"),
            ocr_timeout: Duration::from_secs(
                parse_env("OCR_TIMEOUT_SECS", 120)
                    .context("OCR_TIMEOUT_SECS must be a number of seconds")?,
            ),
            grammar_server_url: url_env("GRAMMAR_SERVER_URL", "http://localhost:8081"),
            grammar_language: env_or("GRAMMAR_LANGUAGE", "en-US"),
            embedding_server_url: url_env("EMBEDDING_SERVER_URL", "http://localhost:11434"),
            embedding_model: env_or("EMBEDDING_MODEL", "all-minilm"),
            http_timeout: Duration::from_secs(
                parse_env("HTTP_TIMEOUT_SECS", 60)
                    .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
            ),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Unset falls back to `default`; set-but-empty disables the service.
fn url_env(key: &str, default: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() => None,
        Ok(v) => Some(v.trim().trim_end_matches('/').to_string()),
        Err(_) => Some(default.to_string()),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("Invalid value '{v}' for environment variable '{key}'")),
        None => Ok(default),
    }
}
