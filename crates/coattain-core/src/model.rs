//! Core data model types for coattain.
//!
//! Course outcomes, weight tables, raw mark entries, the dense mark matrix,
//! and the metadata record pulled from report headers.

use std::collections::HashSet;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RunError;

/// Number of course outcomes tracked per component.
pub const CO_COUNT: usize = 6;

/// Text shown for a cell whose student was not found in a document.
pub const NOT_FOUND: &str = "Not Found";

/// One of the six course outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CourseOutcome {
    #[serde(rename = "CO1")]
    Co1,
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "CO3")]
    Co3,
    #[serde(rename = "CO4")]
    Co4,
    #[serde(rename = "CO5")]
    Co5,
    #[serde(rename = "CO6")]
    Co6,
}

impl CourseOutcome {
    /// All course outcomes in column order.
    pub const ALL: [CourseOutcome; CO_COUNT] = [
        CourseOutcome::Co1,
        CourseOutcome::Co2,
        CourseOutcome::Co3,
        CourseOutcome::Co4,
        CourseOutcome::Co5,
        CourseOutcome::Co6,
    ];

    /// Zero-based column index.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CourseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CO{}", self.index() + 1)
    }
}

impl FromStr for CourseOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CO1" => Ok(CourseOutcome::Co1),
            "CO2" => Ok(CourseOutcome::Co2),
            "CO3" => Ok(CourseOutcome::Co3),
            "CO4" => Ok(CourseOutcome::Co4),
            "CO5" => Ok(CourseOutcome::Co5),
            "CO6" => Ok(CourseOutcome::Co6),
            other => Err(format!("unknown course outcome: {other}")),
        }
    }
}

/// A value per course outcome.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoVector(pub [f64; CO_COUNT]);

impl CoVector {
    pub fn zero() -> Self {
        Self([0.0; CO_COUNT])
    }

    /// Sum of all six entries.
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CourseOutcome, f64)> + '_ {
        CourseOutcome::ALL.iter().map(move |&co| (co, self[co]))
    }

    /// Entry-wise multiplication by a scalar.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v *= factor;
        }
        out
    }
}

impl Index<CourseOutcome> for CoVector {
    type Output = f64;

    fn index(&self, co: CourseOutcome) -> &f64 {
        &self.0[co.index()]
    }
}

impl IndexMut<CourseOutcome> for CoVector {
    fn index_mut(&mut self, co: CourseOutcome) -> &mut f64 {
        &mut self.0[co.index()]
    }
}

impl From<[f64; CO_COUNT]> for CoVector {
    fn from(values: [f64; CO_COUNT]) -> Self {
        Self(values)
    }
}

/// The CO weight split of one assessment component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentWeights {
    /// Component name; matches the document it was read from.
    pub component: String,
    /// Weight per course outcome. The row sum is the component's maximum mark.
    pub weights: CoVector,
}

impl ComponentWeights {
    /// Build a weight row from a slice, checking arity and sign.
    pub fn from_slice(component: impl Into<String>, values: &[f64]) -> Result<Self, RunError> {
        let component = component.into();
        let weights: [f64; CO_COUNT] = values.try_into().map_err(|_| RunError::WeightArity {
            component: component.clone(),
            found: values.len(),
        })?;

        for (co, &value) in CourseOutcome::ALL.iter().zip(weights.iter()) {
            if !value.is_finite() || value < 0.0 {
                return Err(RunError::InvalidWeight {
                    component,
                    co: co.to_string(),
                    value,
                });
            }
        }

        Ok(Self {
            component,
            weights: CoVector(weights),
        })
    }

    /// Maximum achievable mark for this component.
    pub fn row_total(&self) -> f64 {
        self.weights.sum()
    }
}

/// A weight row together with its row-sum column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRowWithTotal {
    pub component: String,
    pub weights: CoVector,
    pub row_total: f64,
}

/// Component → CO weight table, in caller order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightTable {
    rows: Vec<ComponentWeights>,
}

impl WeightTable {
    /// Build a table, rejecting empty tables and duplicate component names.
    pub fn new(rows: Vec<ComponentWeights>) -> Result<Self, RunError> {
        if rows.is_empty() {
            return Err(RunError::MissingWeights);
        }

        let mut seen = HashSet::new();
        for row in &rows {
            if !seen.insert(row.component.as_str()) {
                return Err(RunError::DuplicateComponent(row.component.clone()));
            }
        }

        Ok(Self { rows })
    }

    /// The table without the row-sum column.
    pub fn rows(&self) -> &[ComponentWeights] {
        &self.rows
    }

    /// The table with the row-sum column appended.
    pub fn with_row_totals(&self) -> Vec<WeightRowWithTotal> {
        self.rows
            .iter()
            .map(|r| WeightRowWithTotal {
                component: r.component.clone(),
                weights: r.weights,
                row_total: r.row_total(),
            })
            .collect()
    }

    pub fn get(&self, component: &str) -> Option<&ComponentWeights> {
        self.rows.iter().find(|r| r.component == component)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column sums: the total possible attainment per CO.
    pub fn column_totals(&self) -> CoVector {
        let mut totals = CoVector::zero();
        for row in &self.rows {
            for co in CourseOutcome::ALL {
                totals[co] += row.weights[co];
            }
        }
        totals
    }
}

/// Raw mark token for one (student, component) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkEntry {
    /// The token following the student's identifier.
    Found(String),
    /// The student's identifier did not appear in the document.
    NotFound,
}

impl MarkEntry {
    /// Interpret the raw token as a number.
    pub fn parse(&self) -> ParsedMark {
        match self {
            MarkEntry::Found(token) => match token.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => ParsedMark::Value(value),
                _ => ParsedMark::Unparseable,
            },
            MarkEntry::NotFound => ParsedMark::Unparseable,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MarkEntry::Found(_))
    }
}

impl fmt::Display for MarkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkEntry::Found(token) => f.write_str(token),
            MarkEntry::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

/// A mark after numeric interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedMark {
    Value(f64),
    /// Non-numeric token or the not-found sentinel; scores as zero.
    Unparseable,
}

/// Dense student × component matrix of raw marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkMatrix {
    students: Vec<String>,
    components: Vec<String>,
    /// Row-major, one row per student.
    cells: Vec<Vec<MarkEntry>>,
}

impl MarkMatrix {
    /// An all-`NotFound` matrix.
    pub fn new(students: Vec<String>, components: Vec<String>) -> Self {
        let cells = vec![vec![MarkEntry::NotFound; components.len()]; students.len()];
        Self {
            students,
            components,
            cells,
        }
    }

    pub fn students(&self) -> &[String] {
        &self.students
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn student_index(&self, student: &str) -> Option<usize> {
        self.students.iter().position(|s| s == student)
    }

    pub fn component_index(&self, component: &str) -> Option<usize> {
        self.components.iter().position(|c| c == component)
    }

    pub fn get(&self, student: &str, component: &str) -> Option<&MarkEntry> {
        let row = self.student_index(student)?;
        let col = self.component_index(component)?;
        self.cells.get(row)?.get(col)
    }

    /// Marks of one student, in component order. Empty when out of range.
    pub fn row(&self, index: usize) -> &[MarkEntry] {
        self.cells.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[MarkEntry])> {
        self.students
            .iter()
            .zip(self.cells.iter())
            .map(|(s, row)| (s.as_str(), row.as_slice()))
    }

    /// Set a cell by position. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, col: usize, entry: MarkEntry) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = entry;
        }
    }

    /// Number of cells holding an extracted token.
    pub fn found_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|e| e.is_found())
            .count()
    }
}

/// The fixed header fields of a mark report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    ProgramSection,
    SubjectCodeTitle,
    TestName,
}

impl MetadataField {
    pub const ALL: [MetadataField; 3] = [
        MetadataField::ProgramSection,
        MetadataField::SubjectCodeTitle,
        MetadataField::TestName,
    ];
}

/// Line prefixes that identify each header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLabels {
    #[serde(default = "default_program_section")]
    pub program_section: String,
    #[serde(default = "default_subject_code_title")]
    pub subject_code_title: String,
    #[serde(default = "default_test_name")]
    pub test_name: String,
}

fn default_program_section() -> String {
    "Program Section:".to_string()
}

fn default_subject_code_title() -> String {
    "Subject Code & Title:".to_string()
}

fn default_test_name() -> String {
    "Test Name:".to_string()
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            program_section: default_program_section(),
            subject_code_title: default_subject_code_title(),
            test_name: default_test_name(),
        }
    }
}

impl FieldLabels {
    pub fn label(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::ProgramSection => &self.program_section,
            MetadataField::SubjectCodeTitle => &self.subject_code_title,
            MetadataField::TestName => &self.test_name,
        }
    }
}

/// Header lines found across the processed documents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub program_section: Option<String>,
    #[serde(default)]
    pub subject_code_title: Option<String>,
    #[serde(default)]
    pub test_name: Option<String>,
}

impl Metadata {
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        match field {
            MetadataField::ProgramSection => self.program_section.as_deref(),
            MetadataField::SubjectCodeTitle => self.subject_code_title.as_deref(),
            MetadataField::TestName => self.test_name.as_deref(),
        }
    }

    fn slot(&mut self, field: MetadataField) -> &mut Option<String> {
        match field {
            MetadataField::ProgramSection => &mut self.program_section,
            MetadataField::SubjectCodeTitle => &mut self.subject_code_title,
            MetadataField::TestName => &mut self.test_name,
        }
    }

    /// Fill each empty field from `other`. Set fields are never replaced.
    pub fn merge_missing(&mut self, other: &Metadata) {
        for field in MetadataField::ALL {
            let slot = self.slot(field);
            if slot.as_deref().map_or(true, str::is_empty) {
                if let Some(value) = other.get(field).filter(|v| !v.is_empty()) {
                    *slot = Some(value.to_string());
                }
            }
        }
    }

    pub fn set(&mut self, field: MetadataField, value: impl Into<String>) {
        *self.slot(field) = Some(value.into());
    }
}

/// A document to read, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Component name; usually the file name.
    pub name: String,
    /// Where the text source should read it from.
    pub path: PathBuf,
}

impl DocumentRef {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Component name as shown in rendered reports (`.pdf` suffix removed).
pub fn display_name(component: &str) -> &str {
    component.strip_suffix(".pdf").unwrap_or(component)
}
