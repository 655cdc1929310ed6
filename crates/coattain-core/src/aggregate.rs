//! Merge per-document extraction results into the mark matrix.

use crate::extract::{extract_fields, extract_marks};
use crate::model::{FieldLabels, MarkEntry, MarkMatrix, Metadata};

/// What one document contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub component: String,
    pub line_count: usize,
    pub marks_found: usize,
}

/// Accumulates documents, in processing order, into a dense mark matrix.
#[derive(Debug)]
pub struct Aggregator {
    students: Vec<String>,
    labels: FieldLabels,
    components: Vec<String>,
    marks: Vec<Vec<(usize, String)>>,
    metadata: Metadata,
}

impl Aggregator {
    pub fn new(students: Vec<String>, labels: FieldLabels) -> Self {
        Self {
            students,
            labels,
            components: Vec::new(),
            marks: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    /// Add one document's lines as the next component column.
    pub fn ingest(&mut self, component: &str, lines: &[String]) -> DocumentSummary {
        let found = extract_marks(lines, &self.students);
        self.components.push(component.to_string());

        let column: Vec<(usize, String)> = self
            .students
            .iter()
            .enumerate()
            .filter_map(|(row, s)| found.get(s).map(|m| (row, m.clone())))
            .collect();
        let marks_found = column.len();
        self.marks.push(column);

        let fields = extract_fields(lines, &self.labels);
        self.metadata.merge_missing(&fields);

        DocumentSummary {
            component: component.to_string(),
            line_count: lines.len(),
            marks_found,
        }
    }

    /// Build the matrix; cells never filled stay `NotFound`.
    pub fn finish(self) -> (MarkMatrix, Metadata) {
        let mut matrix = MarkMatrix::new(self.students, self.components);
        for (col, column) in self.marks.into_iter().enumerate() {
            for (row, mark) in column {
                matrix.set(row, col, MarkEntry::Found(mark));
            }
        }
        (matrix, self.metadata)
    }
}
