//! OCR fallback for scanned PDFs.
//!
//! Pages are rendered to PNG by an external renderer (poppler's `pdftoppm`)
//! into a scratch directory, then each image is passed through an external
//! OCR engine (`tesseract <image> stdout`). Both executables are configurable.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use super::pdf::join_pages;

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub renderer_path: String,
    pub engine_path: String,
    pub dpi: u32,
    /// Applied to each external process individually.
    pub timeout: Duration,
}

impl OcrConfig {
    pub fn new(renderer_path: String, engine_path: String, timeout: Duration) -> Self {
        Self {
            renderer_path,
            engine_path,
            dpi: 300,
            timeout,
        }
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("renderer produced no page images")]
    NoPages,
}

/// Renders every page and OCRs it, joining the non-empty page outputs with
/// newlines.
pub async fn ocr_pdf(path: &Path, config: &OcrConfig) -> Result<String, OcrError> {
    let scratch = tempfile::tempdir().map_err(OcrError::Scratch)?;
    let prefix = scratch.path().join("page");

    let mut render = Command::new(&config.renderer_path);
    render
        .arg("-r")
        .arg(config.dpi.to_string())
        .arg("-png")
        .arg(path)
        .arg(&prefix);
    run(render, &config.renderer_path, config.timeout).await?;

    let images = rendered_pages(scratch.path()).map_err(OcrError::Scratch)?;
    if images.is_empty() {
        return Err(OcrError::NoPages);
    }
    info!("Running OCR on {} rendered page(s)", images.len());

    let mut pages = Vec::with_capacity(images.len());
    for image in &images {
        let mut ocr = Command::new(&config.engine_path);
        ocr.arg(image).arg("stdout");
        let output = run(ocr, &config.engine_path, config.timeout).await?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR page {}: {} chars", image.display(), text.len());
        pages.push(text);
    }

    Ok(join_pages(pages))
}

/// Page images in page order. The renderer zero-pads page numbers to a common
/// width, so a lexical sort is enough.
fn rendered_pages(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false)
        })
        .collect();
    images.sort();
    Ok(images)
}

async fn run(mut command: Command, program: &str, timeout: Duration) -> Result<Output, OcrError> {
    command.kill_on_drop(true);
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| OcrError::Timeout {
            program: program.to_string(),
            secs: timeout.as_secs(),
        })?
        .map_err(|source| OcrError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(OcrError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}
