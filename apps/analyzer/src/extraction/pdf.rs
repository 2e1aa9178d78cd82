//! Direct PDF text-layer extraction via `pdf-extract`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("PDF backend panicked while reading {0}")]
    Panicked(PathBuf),

    #[error("PDF worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Extracts the text layer page by page and joins the non-empty pages with
/// newlines. `pdf-extract` panics on some malformed inputs; that is reported
/// as an error so the caller can fall back to OCR.
pub async fn extract_text_layer(path: &Path) -> Result<String, PdfError> {
    let owned = path.to_path_buf();
    let pages = tokio::task::spawn_blocking(move || {
        std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(&owned))
            .map_err(|_| PdfError::Panicked(owned.clone()))?
            .map_err(|e| PdfError::Parse(e.to_string()))
    })
    .await??;

    debug!("PDF text layer: {} page(s)", pages.len());
    Ok(join_pages(pages))
}

/// Joins page texts with `\n`, dropping pages that are blank.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .filter(|p| !p.as_ref().trim().is_empty())
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_skips_blank_pages() {
        let pages = vec!["Page one", "   \n", "", "Page three"];
        assert_eq!(join_pages(pages), "Page one\nPage three");
    }

    #[test]
    fn test_join_pages_all_blank_is_empty() {
        assert_eq!(join_pages(vec![" ", "\n"]), "");
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_error_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert!(extract_text_layer(&path).await.is_err());
    }
}
