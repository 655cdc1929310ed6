//! Attainment report types with JSON persistence and run comparison.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attainment::{
    AttainmentLevel, AttainmentPolicy, CoSummary, CohortSummary, StudentAttainment,
};
use crate::model::{
    display_name, CourseOutcome, MarkMatrix, Metadata, WeightRowWithTotal, WeightTable,
};

/// A complete attainment report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttainmentReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the run inputs.
    pub run: RunSummary,
    /// Institution line for rendered headers.
    #[serde(default)]
    pub institution: Option<String>,
    /// Header fields found in the documents.
    pub metadata: Metadata,
    /// Raw marks, student × component.
    pub marks: MarkMatrix,
    /// Weight table without the row-sum column.
    pub weights: WeightTable,
    /// Weight table with the row-sum column.
    pub weight_totals: Vec<WeightRowWithTotal>,
    /// Per-student attainment per CO.
    pub attainment: Vec<StudentAttainment>,
    /// Cohort totals, targets, and levels.
    pub cohort: CohortSummary,
    /// Policy the levels were computed with.
    pub policy: AttainmentPolicy,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of the run that produced a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Documents in processing order.
    pub documents: Vec<String>,
    pub student_count: usize,
}

/// Write a file via a temp file in the same directory and rename it into
/// place, so readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
    tmp.write_all(contents)?;
    tmp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

impl AttainmentReport {
    /// File name stem unique to this run: timestamp plus the short report id.
    pub fn artifact_stem(&self) -> String {
        let short_id = self.id.simple().to_string();
        format!(
            "attainment-{}-{}",
            self.created_at.format("%Y-%m-%dT%H%M%S"),
            &short_id[..8]
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        write_atomic(path, json.as_bytes())
            .with_context(|| format!("failed to write report to {}", path.display()))
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttainmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the cohort summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.run.name));
        for line in [
            self.metadata.program_section.as_deref(),
            self.metadata.subject_code_title.as_deref(),
            self.metadata.test_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            md.push_str(&format!("- {line}\n"));
        }

        let components: Vec<&str> = self.run.documents.iter().map(|d| display_name(d)).collect();
        md.push_str(&format!(
            "\n**Students:** {} | **Components:** {}\n\n",
            self.run.student_count,
            components.join(", ")
        ));

        md.push_str("| | CO1 | CO2 | CO3 | CO4 | CO5 | CO6 |\n");
        md.push_str("|---|---|---|---|---|---|---|\n");
        md.push_str(&self.summary_row("Total Possible Attainment", |s| {
            format!("{:.2}", s.total_possible)
        }));
        md.push_str(&self.summary_row("Target", |s| format!("{:.2}", s.target)));
        md.push_str(&self.summary_row("No of students > Target", |s| {
            s.count_above_target.to_string()
        }));
        md.push_str(&self.summary_row("% of students > Target", |s| {
            format!("{:.2}%", s.percent_above_target)
        }));
        md.push_str(&self.summary_row("Attainment Level", |s| s.level.to_string()));

        md.push_str(&format!(
            "\n**Average of all CO attainment levels:** {:.2}\n\n_{}_\n",
            self.cohort.average_level,
            self.policy.legend()
        ));

        md
    }

    fn summary_row(&self, label: &str, cell: impl Fn(&CoSummary) -> String) -> String {
        let cells: Vec<String> = self.cohort.per_co.iter().map(cell).collect();
        format!("| {} | {} |\n", label, cells.join(" | "))
    }

    /// Compare this report's cohort summary against a baseline.
    pub fn compare(&self, baseline: &AttainmentReport) -> ComparisonReport {
        let per_co = CourseOutcome::ALL
            .iter()
            .filter_map(|&co| {
                let current = self.cohort.get(co)?;
                let base = baseline.cohort.get(co)?;
                Some(CoDelta {
                    co,
                    baseline_level: base.level,
                    current_level: current.level,
                    baseline_percent: base.percent_above_target,
                    current_percent: current.percent_above_target,
                    delta_percent: current.percent_above_target - base.percent_above_target,
                })
            })
            .collect();

        ComparisonReport {
            baseline_name: baseline.run.name.clone(),
            current_name: self.run.name.clone(),
            per_co,
            average_level_delta: self.cohort.average_level - baseline.cohort.average_level,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub baseline_name: String,
    pub current_name: String,
    pub per_co: Vec<CoDelta>,
    pub average_level_delta: f64,
}

/// Change in one CO between two runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoDelta {
    pub co: CourseOutcome,
    pub baseline_level: AttainmentLevel,
    pub current_level: AttainmentLevel,
    pub baseline_percent: f64,
    pub current_percent: f64,
    pub delta_percent: f64,
}

impl ComparisonReport {
    /// COs whose level went down.
    pub fn level_drops(&self) -> impl Iterator<Item = &CoDelta> {
        self.per_co
            .iter()
            .filter(|d| d.current_level < d.baseline_level)
    }

    /// Returns true if any CO level went down.
    pub fn has_level_drops(&self) -> bool {
        self.level_drops().next().is_some()
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        let drops = self.level_drops().count();
        md.push_str(&format!(
            "**Summary:** {} → {}: {} level drop(s), average level {:+.2}\n\n",
            self.baseline_name, self.current_name, drops, self.average_level_delta
        ));

        md.push_str("| CO | Baseline | Current | Baseline % | Current % | Delta |\n");
        md.push_str("|----|----------|---------|------------|-----------|-------|\n");
        for d in &self.per_co {
            md.push_str(&format!(
                "| {} | {} | {} | {:.2}% | {:.2}% | {:+.2}% |\n",
                d.co,
                d.baseline_level,
                d.current_level,
                d.baseline_percent,
                d.current_percent,
                d.delta_percent
            ));
        }

        md
    }
}
