//! Capability registry: which optional backends this process can use.
//!
//! Detected once at startup. Components check their flag (or their injected
//! handle) before attempting a call and fall back to the documented sentinel
//! instead.

use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

const DETECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Direct PDF text-layer extraction.
    pub pdf_text: bool,
    pub docx: bool,
    /// External PDF page renderer (pdftoppm).
    pub ocr_renderer: bool,
    /// External OCR engine (tesseract).
    pub ocr_engine: bool,
    pub grammar: bool,
    pub embedding: bool,
    pub generative: bool,
}

impl Capabilities {
    /// OCR needs both the renderer and the engine.
    pub fn ocr(&self) -> bool {
        self.ocr_renderer && self.ocr_engine
    }

    pub fn log_summary(&self) {
        info!(
            pdf_text = self.pdf_text,
            docx = self.docx,
            ocr = self.ocr(),
            grammar = self.grammar,
            embedding = self.embedding,
            generative = self.generative,
            "Capability registry initialized"
        );
        if !self.ocr() {
            warn!("OCR unavailable: scanned PDFs will yield no text");
        }
    }
}

/// Returns true when `program` can be spawned and exits successfully with
/// `version_flag`. Used for the OCR renderer and engine.
pub async fn detect_executable(program: &str, version_flag: &str) -> bool {
    let mut command = Command::new(program);
    command.arg(version_flag).kill_on_drop(true);

    match tokio::time::timeout(DETECT_TIMEOUT, command.output()).await {
        Ok(Ok(output)) if output.status.success() => {
            info!("Found executable '{program}'");
            true
        }
        Ok(Ok(output)) => {
            warn!("Executable '{program}' exited with {}", output.status);
            false
        }
        Ok(Err(e)) => {
            warn!("Executable '{program}' not usable: {e}");
            false
        }
        Err(_) => {
            warn!("Executable '{program}' did not answer within {DETECT_TIMEOUT:?}");
            false
        }
    }
}
