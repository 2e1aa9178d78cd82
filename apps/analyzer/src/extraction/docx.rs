//! DOCX text extraction.
//!
//! Only top-level body paragraphs are read. Tables, headers, footers and text
//! box contents are not part of the extracted text. Within a paragraph, run
//! text is concatenated with `<w:tab/>` and `<w:br/>` mapped to a tab and a
//! newline; hyperlink runs count as paragraph text.

use std::path::Path;

use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable .docx document: {0}")]
    Parse(String),
}

/// Joins the non-blank body paragraphs of a .docx file with newlines.
pub fn extract_docx(path: &Path) -> Result<String, DocxError> {
    let bytes = std::fs::read(path).map_err(|source| DocxError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let docx = read_docx(&bytes).map_err(|e| DocxError::Parse(format!("{e:?}")))?;

    Ok(docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&para.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, text),
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            _ => {}
        }
    }
}

fn push_run(run: &Run, text: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

/// Writes a .docx package whose body is `body_xml`. The package parts other
/// than `word/document.xml` come from an empty `docx-rs` document so the file
/// is as complete as one Word would produce.
#[cfg(test)]
pub(crate) fn write_docx(path: &Path, body_xml: &str) {
    use std::io::{Cursor, Read, Write};
    use zip::write::SimpleFileOptions;

    let mut template = Cursor::new(Vec::new());
    docx_rs::Docx::new().build().pack(&mut template).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(template.into_inner())).unwrap();

    let document_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body_xml}</w:body></w:document>"#
    );

    let file = std::fs::File::create(path).unwrap();
    let mut out = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        if name == "word/document.xml" {
            data = document_xml.as_bytes().to_vec();
        }
        out.start_file(name, options).unwrap();
        out.write_all(&data).unwrap();
    }
    out.finish().unwrap();
}
