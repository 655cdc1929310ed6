//! Plain-text source for reports that were already converted to text.

use anyhow::{Context, Result};

use coattain_core::model::DocumentRef;
use coattain_core::traits::TextSource;

/// Reads a UTF-8 text file as a single page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextSource;

impl PlainTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PlainTextSource {
    fn name(&self) -> &str {
        "text"
    }

    fn extract_lines(&self, document: &DocumentRef) -> Result<Vec<String>> {
        let bytes = std::fs::read(&document.path)
            .with_context(|| format!("failed to read {}", document.path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.lines().map(str::to_string).collect())
    }
}
