//! Field and mark extraction from a document's line sequence.

use std::collections::{HashMap, HashSet};

use crate::model::{FieldLabels, Metadata, MetadataField};

/// Pull the header fields out of one document's lines.
///
/// For each field, the first line starting with its label wins. Fields with
/// no matching line stay `None`.
pub fn extract_fields(lines: &[String], labels: &FieldLabels) -> Metadata {
    let mut meta = Metadata::default();
    for line in lines {
        for field in MetadataField::ALL {
            if meta.get(field).is_none() && line.starts_with(labels.label(field)) {
                meta.set(field, line.as_str());
            }
        }
    }
    meta
}

/// Find each student's mark in one document's lines.
///
/// A student's identifier must appear as a whitespace-delimited token; the
/// token right after its first occurrence on the line is the mark. When the
/// identifier is the last token on the line nothing is recorded for that
/// line. If an identifier shows up on several lines, the last one wins.
pub fn extract_marks(lines: &[String], students: &[String]) -> HashMap<String, String> {
    let wanted: HashSet<&str> = students.iter().map(String::as_str).collect();
    let mut marks: HashMap<String, String> = HashMap::new();

    for (line_no, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut seen_on_line: HashSet<&str> = HashSet::new();

        for (pos, &token) in tokens.iter().enumerate() {
            if !wanted.contains(token) || !seen_on_line.insert(token) {
                continue;
            }
            let Some(&mark) = tokens.get(pos + 1) else {
                tracing::debug!("line {line_no}: '{token}' has no trailing mark token");
                continue;
            };
            if let Some(previous) = marks.insert(token.to_string(), mark.to_string()) {
                tracing::debug!(
                    "line {line_no}: '{token}' seen again, replacing mark '{previous}' with '{mark}'"
                );
            }
        }
    }

    marks
}
