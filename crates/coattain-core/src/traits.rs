//! Text source trait.
//!
//! Implemented by the `coattain-pdf` crate for PDF and plain-text reports.
//! The in-memory source here backs tests and callers that already hold the
//! extracted text.

use std::collections::HashMap;

use anyhow::Result;

use crate::model::DocumentRef;

/// Turns a document into its ordered line sequence.
pub trait TextSource: Send + Sync {
    /// Human-readable source name (e.g. "pdf").
    fn name(&self) -> &str;

    /// Read every line of the document, page by page.
    ///
    /// Pages without extractable text contribute no lines. An error means the
    /// document as a whole could not be read.
    fn extract_lines(&self, document: &DocumentRef) -> Result<Vec<String>>;
}

/// Serves pre-extracted text keyed by document name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(name.into(), text.into());
        self
    }
}

impl TextSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn extract_lines(&self, document: &DocumentRef) -> Result<Vec<String>> {
        let text = self
            .documents
            .get(&document.name)
            .ok_or_else(|| anyhow::anyhow!("no such document: {}", document.name))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}
