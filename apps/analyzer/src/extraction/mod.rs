//! Extraction backends: turn a resume file into raw text.
//!
//! Dispatch is by filename suffix. Each backend is optional: the registry in
//! `capabilities` decides which ones are attempted. The text returned here is
//! NOT normalized; the pipeline runs `normalize` on it.

pub mod docx;
pub mod ocr;
pub mod pdf;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::capabilities::Capabilities;
use crate::errors::AnalysisError;

pub use ocr::OcrConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Case-insensitive suffix dispatch.
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let lower = path.to_string_lossy().to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(DocumentFormat::Docx)
        } else if lower.ends_with(".txt") {
            Ok(DocumentFormat::Txt)
        } else {
            Err(AnalysisError::UnsupportedFormat(
                path.display().to_string(),
            ))
        }
    }
}

/// A resume file on disk. Read-only for the duration of one analysis.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub format: DocumentFormat,
}

impl Document {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, AnalysisError> {
        let path = path.into();
        let format = DocumentFormat::from_path(&path)?;
        Ok(Self { path, format })
    }
}

/// Format-dispatching extractor. Cheap to clone; holds only configuration.
#[derive(Debug, Clone)]
pub struct Extractor {
    pdf_text: bool,
    docx: bool,
    ocr_enabled: bool,
    ocr: OcrConfig,
}

impl Extractor {
    pub fn new(capabilities: &Capabilities, ocr: OcrConfig) -> Self {
        Self {
            pdf_text: capabilities.pdf_text,
            docx: capabilities.docx,
            ocr_enabled: capabilities.ocr(),
            ocr,
        }
    }

    /// Extracts raw text. A blank `Ok` result is possible (scanned PDF with no
    /// OCR); the caller treats that as its own error.
    pub async fn extract(&self, document: &Document) -> Result<String, AnalysisError> {
        match document.format {
            DocumentFormat::Pdf => Ok(self.extract_pdf(&document.path).await),
            DocumentFormat::Docx => self.extract_docx(&document.path).await,
            DocumentFormat::Txt => extract_txt(&document.path).await,
        }
    }

    async fn extract_pdf(&self, path: &Path) -> String {
        let text = if self.pdf_text {
            match pdf::extract_text_layer(path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("PDF text-layer extraction failed: {e}");
                    String::new()
                }
            }
        } else {
            debug!("PDF text-layer backend unavailable; skipping direct extraction");
            String::new()
        };

        if !text.trim().is_empty() {
            return text;
        }

        info!("PDF has no text layer; falling back to OCR");
        if !self.ocr_enabled {
            warn!("OCR backend unavailable; cannot read scanned PDF");
            return String::new();
        }

        match ocr::ocr_pdf(path, &self.ocr).await {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR extraction failed: {e}");
                String::new()
            }
        }
    }

    async fn extract_docx(&self, path: &Path) -> Result<String, AnalysisError> {
        if !self.docx {
            return Err(AnalysisError::ExtractionFailure(
                "DOCX backend is not available; unable to extract .docx files".to_string(),
            ));
        }
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || docx::extract_docx(&owned))
            .await
            .map_err(|e| AnalysisError::ExtractionFailure(format!("DOCX worker failed: {e}")))?
            .map_err(|e| AnalysisError::ExtractionFailure(e.to_string()))
    }
}

/// Reads the whole file, silently dropping byte sequences that are not UTF-8.
async fn extract_txt(path: &Path) -> Result<String, AnalysisError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AnalysisError::ExtractionFailure(format!("{}: {e}", path.display())))?;
    Ok(decode_ignoring_invalid(&bytes))
}

fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn no_ocr() -> Capabilities {
        Capabilities {
            pdf_text: true,
            docx: true,
            ocr_renderer: false,
            ocr_engine: false,
            grammar: false,
            embedding: false,
            generative: false,
        }
    }

    fn extractor(caps: &Capabilities) -> Extractor {
        Extractor::new(
            caps,
            OcrConfig {
                renderer_path: "pdftoppm".to_string(),
                engine_path: "tesseract".to_string(),
                dpi: 300,
                timeout: Duration::from_secs(5),
            },
        )
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_format_dispatch_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("cv.PDF")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("/tmp/Resume.Docx")).unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.txt")).unwrap(),
            DocumentFormat::Txt
        );
    }

    #[test]
    fn test_unknown_suffix_is_unsupported() {
        let err = Document::from_path("resume.odt").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat(p) if p == "resume.odt"));
    }

    #[test]
    fn test_decode_drops_invalid_bytes() {
        let bytes = b"Skills\xff\xfe: Rust";
        assert_eq!(decode_ignoring_invalid(bytes), "Skills: Rust");
    }

    #[tokio::test]
    async fn test_txt_extraction_reads_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "resume.txt", b"Summary\n- Built things\n");
        let doc = Document::from_path(&path).unwrap();
        let text = extractor(&no_ocr()).extract(&doc).await.unwrap();
        assert_eq!(text, "Summary\n- Built things\n");
    }

    #[tokio::test]
    async fn test_missing_txt_is_extraction_failure() {
        let doc = Document::from_path("/nonexistent/dir/resume.txt").unwrap();
        let err = extractor(&no_ocr()).extract(&doc).await.unwrap_err();
        assert!(matches!(err, AnalysisError::ExtractionFailure(_)));
    }

    #[tokio::test]
    async fn test_docx_backend_unavailable_is_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "resume.docx", b"not really a docx");
        let caps = Capabilities {
            docx: false,
            ..no_ocr()
        };
        let doc = Document::from_path(&path).unwrap();
        let err = extractor(&caps).extract(&doc).await.unwrap_err();
        match err {
            AnalysisError::ExtractionFailure(msg) => assert!(msg.contains("DOCX")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_pdf_without_ocr_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scan.pdf", b"%PDF-1.4 garbage");
        let doc = Document::from_path(&path).unwrap();
        let text = extractor(&no_ocr()).extract(&doc).await.unwrap();
        assert!(text.trim().is_empty());
    }

    #[tokio::test]
    async fn test_pdf_with_every_backend_disabled_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "resume.pdf", b"%PDF-1.4");
        let caps = Capabilities {
            pdf_text: false,
            ..no_ocr()
        };
        let doc = Document::from_path(&path).unwrap();
        assert_eq!(extractor(&caps).extract(&doc).await.unwrap(), "");
    }

    #[cfg(unix)]
    mod ocr_fallback {
        use super::*;
        use crate::extraction::ocr::testing;

        fn with_ocr(config: OcrConfig) -> Extractor {
            let caps = Capabilities {
                ocr_renderer: true,
                ocr_engine: true,
                ..no_ocr()
            };
            Extractor::new(&caps, config)
        }

        #[tokio::test]
        async fn test_scanned_pdf_falls_back_to_ocr() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_file(&dir, "scan.pdf", b"%PDF-1.4 no text layer");
            let config = testing::config(
                testing::renderer(dir.path()),
                testing::engine(dir.path()),
                Duration::from_secs(10),
            );

            let doc = Document::from_path(&path).unwrap();
            let text = with_ocr(config).extract(&doc).await.unwrap();
            assert_eq!(text.trim_end(), testing::PAGE_ONE_TEXT);
        }

        #[tokio::test]
        async fn test_ocr_engine_failure_yields_empty_text() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_file(&dir, "scan.pdf", b"%PDF-1.4 no text layer");
            let config = testing::config(
                testing::renderer(dir.path()),
                testing::failing_engine(dir.path()),
                Duration::from_secs(10),
            );

            let doc = Document::from_path(&path).unwrap();
            assert_eq!(with_ocr(config).extract(&doc).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_ocr_engine_timeout_yields_empty_text() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_file(&dir, "scan.pdf", b"%PDF-1.4 no text layer");
            let config = testing::config(
                testing::renderer(dir.path()),
                testing::slow_engine(dir.path()),
                Duration::from_millis(500),
            );

            let doc = Document::from_path(&path).unwrap();
            assert_eq!(with_ocr(config).extract(&doc).await.unwrap(), "");
        }
    }
}
