//! coattain-pdf: Document text sources.
//!
//! Implements the `TextSource` trait for PDF mark reports (via pdf_oxide)
//! and for pre-extracted plain-text reports, plus a source that picks one
//! by file extension.

pub mod pdf;
pub mod plain;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;

use coattain_core::model::DocumentRef;
use coattain_core::traits::TextSource;

pub use pdf::PdfTextSource;
pub use plain::PlainTextSource;

/// Which text source to read documents with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    Pdf,
    Text,
    /// Choose per document from its extension.
    #[default]
    Auto,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Pdf => write!(f, "pdf"),
            SourceKind::Text => write!(f, "text"),
            SourceKind::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(SourceKind::Pdf),
            "text" | "txt" => Ok(SourceKind::Text),
            "auto" => Ok(SourceKind::Auto),
            other => Err(format!("unknown source kind: {other}")),
        }
    }
}

/// Dispatches `.txt` files to the plain-text source and everything else to
/// the PDF source.
#[derive(Debug, Default)]
pub struct AutoTextSource {
    pdf: PdfTextSource,
    plain: PlainTextSource,
}

impl AutoTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn pick(&self, document: &DocumentRef) -> &dyn TextSource {
        let is_text = document
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_text {
            &self.plain
        } else {
            &self.pdf
        }
    }
}

impl TextSource for AutoTextSource {
    fn name(&self) -> &str {
        "auto"
    }

    fn extract_lines(&self, document: &DocumentRef) -> Result<Vec<String>> {
        let source = self.pick(document);
        tracing::debug!("reading {} with {} source", document.name, source.name());
        source.extract_lines(document)
    }
}

/// Create a text source instance.
pub fn create_source(kind: SourceKind) -> Arc<dyn TextSource> {
    match kind {
        SourceKind::Pdf => Arc::new(PdfTextSource::new()),
        SourceKind::Text => Arc::new(PlainTextSource::new()),
        SourceKind::Auto => Arc::new(AutoTextSource::new()),
    }
}
