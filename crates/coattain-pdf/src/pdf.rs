//! PDF text source backed by pdf_oxide.

use anyhow::{Context, Result};
use pdf_oxide::document::PdfDocument;

use coattain_core::model::DocumentRef;
use coattain_core::traits::TextSource;

/// Reads a PDF page by page and splits each page's text into lines.
///
/// A page whose text cannot be extracted is logged and skipped; only a
/// document that cannot be opened or counted is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

impl PdfTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PdfTextSource {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract_lines(&self, document: &DocumentRef) -> Result<Vec<String>> {
        let mut doc = PdfDocument::open(&document.path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to open PDF: {}", document.path.display()))?;

        let page_count = doc
            .page_count()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to read page tree: {}", document.path.display()))?;

        let mut lines = Vec::new();
        for page in 0..page_count {
            match doc.extract_text(page) {
                Ok(text) => {
                    let before = lines.len();
                    lines.extend(text.lines().map(str::to_string));
                    if lines.len() == before {
                        tracing::debug!("{} page {}: no text", document.name, page + 1);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "{} page {}: text extraction failed, skipping: {}",
                        document.name,
                        page + 1,
                        e
                    );
                }
            }
        }

        tracing::debug!(
            "{}: {} pages, {} lines",
            document.name,
            page_count,
            lines.len()
        );
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let source = PdfTextSource::new();
        let err = source
            .extract_lines(&DocumentRef::new("nope.pdf", "/nonexistent/nope.pdf"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to open PDF"));
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let source = PdfTextSource::new();
        assert!(source
            .extract_lines(&DocumentRef::new("bad.pdf", &path))
            .is_err());
    }
}
