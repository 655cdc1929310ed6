//! TOML run file parser.
//!
//! Loads a run (documents in processing order, student identifiers, and the
//! component weight table) from a TOML file, and validates it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::RunError;
use crate::model::{display_name, ComponentWeights, WeightTable, CO_COUNT};

/// Intermediate TOML structure for parsing run files.
#[derive(Debug, Deserialize)]
struct TomlRunFile {
    run: TomlRunHeader,
    #[serde(default)]
    components: Vec<TomlComponent>,
}

#[derive(Debug, Deserialize)]
struct TomlRunHeader {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    documents: Vec<String>,
    #[serde(default)]
    students: Vec<String>,
    #[serde(default)]
    students_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TomlComponent {
    name: String,
    weights: Vec<f64>,
}

/// A fully parsed attainment run.
#[derive(Debug, Clone)]
pub struct RunSpec {
    /// Human-readable run name.
    pub name: String,
    pub description: String,
    /// Document file names in processing order.
    pub documents: Vec<String>,
    /// Student identifiers in output order. May contain duplicates;
    /// `validate_run_spec` reports them.
    pub students: Vec<String>,
    pub weights: WeightTable,
}

/// Parse a run file. A `students_file` is resolved against the run file's
/// directory.
pub fn parse_run_spec(path: &Path) -> Result<RunSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read run file: {}", path.display()))?;

    parse_run_spec_str(&content, path)
}

/// Parse a TOML string into a `RunSpec` (useful for testing).
pub fn parse_run_spec_str(content: &str, source_path: &Path) -> Result<RunSpec> {
    let parsed: TomlRunFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut students = parsed.run.students;
    if let Some(file) = &parsed.run.students_file {
        let resolved = match source_path.parent() {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.clone(),
        };
        students.extend(load_student_list(&resolved)?);
    }
    if students.is_empty() {
        return Err(RunError::MissingStudents.into());
    }
    if parsed.run.documents.is_empty() {
        return Err(RunError::MissingDocuments.into());
    }

    let mut seen = HashSet::new();
    for doc in &parsed.run.documents {
        if !seen.insert(doc.as_str()) {
            return Err(RunError::DuplicateDocument(doc.clone()).into());
        }
    }

    let rows = parsed
        .components
        .into_iter()
        .map(|c| ComponentWeights::from_slice(c.name, &c.weights))
        .collect::<Result<Vec<_>, RunError>>()?;
    let weights = WeightTable::new(rows)?;

    Ok(RunSpec {
        name: parsed.run.name,
        description: parsed.run.description,
        documents: parsed.run.documents,
        students,
        weights,
    })
}

/// Split a student list on commas and whitespace, dropping empty entries.
pub fn parse_student_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim_matches('"'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a student list file.
pub fn load_student_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read student list: {}", path.display()))?;
    Ok(parse_student_list(&content))
}

/// A warning from run validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The component (if applicable).
    pub component: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a run for common issues that do not stop it from running.
pub fn validate_run_spec(spec: &RunSpec) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate students
    let mut seen = HashSet::new();
    for student in &spec.students {
        if !seen.insert(student.as_str()) {
            warnings.push(ValidationWarning {
                component: None,
                message: format!("duplicate registration number: {student}"),
            });
        }
    }

    // Weight rows that no document will fill
    for row in spec.weights.rows() {
        if !spec.documents.contains(&row.component) {
            warnings.push(ValidationWarning {
                component: Some(row.component.clone()),
                message: "weight row has no matching document; it counts toward totals only"
                    .into(),
            });
        }
    }

    // Documents that will not be scored
    for doc in &spec.documents {
        if spec.weights.get(doc).is_none() {
            warnings.push(ValidationWarning {
                component: Some(doc.clone()),
                message: "document has no weight row and will not be scored".into(),
            });
        }
    }

    // Components whose percentage will always be zero
    for row in spec.weights.rows() {
        if row.row_total() <= 0.0 {
            warnings.push(ValidationWarning {
                component: Some(row.component.clone()),
                message: "all weights are zero; marks for this component score 0%".into(),
            });
        }
    }

    warnings
}

/// Render a run file skeleton with one blank weight row per document.
pub fn render_run_template(name: &str, documents: &[String]) -> String {
    let mut out = String::new();
    out.push_str("[run]\n");
    out.push_str(&format!("name = {}\n", toml_string(name)));
    out.push_str("documents = [\n");
    for doc in documents {
        out.push_str(&format!("    {},\n", toml_string(doc)));
    }
    out.push_str("]\n");
    out.push_str("students = []\n");
    out.push_str("# students_file = \"students.txt\"\n");

    let blank = vec!["0"; CO_COUNT].join(", ");
    for doc in documents {
        out.push_str(&format!("\n# {}\n", display_name(doc)));
        out.push_str("[[components]]\n");
        out.push_str(&format!("name = {}\n", toml_string(doc)));
        out.push_str(&format!("weights = [{blank}]  # CO1..CO6\n"));
    }
    out
}

fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}
