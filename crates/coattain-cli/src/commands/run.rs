//! The `coattain run` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use coattain_core::aggregate::DocumentSummary;
use coattain_core::config::load_config_from;
use coattain_core::engine::{Pipeline, ProgressReporter, RunContext};
use coattain_core::model::display_name;
use coattain_core::parser;
use coattain_core::report::{write_atomic, AttainmentReport};
use coattain_pdf::{create_source, SourceKind};
use coattain_report::html::generate_html;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_document_start(&self, index: usize, total: usize, document: &str) {
        eprintln!("  [{}/{}] Reading: {}", index + 1, total, document);
    }

    fn on_document_complete(&self, summary: &DocumentSummary) {
        eprintln!(
            "  Done: {} ({} lines, {} marks found)",
            display_name(&summary.component),
            summary.line_count,
            summary.marks_found
        );
    }

    fn on_run_complete(&self, report: &AttainmentReport, elapsed: Duration) {
        eprintln!(
            "\nComplete: {} students x {} components ({:.1}s)",
            report.run.student_count,
            report.run.documents.len(),
            elapsed.as_secs_f64()
        );
    }
}

/// Report artifacts a run can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Html,
    Markdown,
}

fn parse_formats(format: &str) -> Result<Vec<OutputFormat>> {
    if format.trim() == "all" {
        return Ok(vec![
            OutputFormat::Json,
            OutputFormat::Html,
            OutputFormat::Markdown,
        ]);
    }

    let mut formats = Vec::new();
    for f in format.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        let parsed = match f {
            "json" => OutputFormat::Json,
            "html" => OutputFormat::Html,
            "md" | "markdown" => OutputFormat::Markdown,
            other => anyhow::bail!("unknown output format: '{other}'"),
        };
        if !formats.contains(&parsed) {
            formats.push(parsed);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "at least one output format is required");
    Ok(formats)
}

pub fn execute(
    spec_path: PathBuf,
    documents: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<String>,
    source: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    // Load config
    let config = load_config_from(config_path.as_deref())?;

    // Everything below is checked before the first document is opened
    let source_kind: SourceKind = source.parse().map_err(anyhow::Error::msg)?;
    let formats = parse_formats(format.as_deref().unwrap_or(&config.default_format))?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let spec = parser::parse_run_spec(&spec_path)?;
    for w in parser::validate_run_spec(&spec) {
        match &w.component {
            Some(c) => eprintln!("Warning: [{c}] {}", w.message),
            None => eprintln!("Warning: {}", w.message),
        }
    }

    let mut context = RunContext::from_config(&config);
    if let Some(dir) = documents {
        context = context.with_document_dir(dir);
    }

    eprintln!(
        "coattain v{}: {} documents x {} students from {}",
        env!("CARGO_PKG_VERSION"),
        spec.documents.len(),
        spec.students.len(),
        context.document_dir.display()
    );
    eprintln!();

    let pipeline = Pipeline::new(create_source(source_kind), context);
    let report = pipeline.run(&spec, &ConsoleReporter)?;

    // Print summary table
    eprintln!("\n{}", super::summary_table(&report));
    eprintln!(
        "Average of all CO attainment levels: {:.2}",
        report.cohort.average_level
    );

    // Render everything before the first file is written
    let stem = report.artifact_stem();
    let mut artifacts = Vec::with_capacity(formats.len());
    for fmt in formats {
        let artifact = match fmt {
            OutputFormat::Json => Artifact {
                label: "Results saved to",
                path: output.join(format!("{stem}.json")),
                contents: serde_json::to_string_pretty(&report)
                    .context("failed to serialize report")?
                    .into_bytes(),
            },
            OutputFormat::Html => Artifact {
                label: "HTML report",
                path: output.join(format!("{stem}.html")),
                contents: generate_html(&report).into_bytes(),
            },
            OutputFormat::Markdown => Artifact {
                label: "Markdown summary",
                path: output.join(format!("{stem}.md")),
                contents: report.to_markdown().into_bytes(),
            },
        };
        artifacts.push(artifact);
    }

    persist_artifacts(&artifacts)?;
    for artifact in &artifacts {
        eprintln!("{}: {}", artifact.label, artifact.path.display());
    }

    Ok(())
}

/// A rendered output file waiting to be written.
struct Artifact {
    label: &'static str,
    path: PathBuf,
    contents: Vec<u8>,
}

/// Write every artifact, or none: on the first failure the files already
/// written by this call are removed again.
fn persist_artifacts(artifacts: &[Artifact]) -> Result<()> {
    let mut written: Vec<&Path> = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        if let Err(e) = write_atomic(&artifact.path, &artifact.contents) {
            for path in written {
                if let Err(remove_err) = std::fs::remove_file(path) {
                    tracing::warn!("failed to remove {}: {remove_err}", path.display());
                }
            }
            return Err(e);
        }
        written.push(&artifact.path);
    }
    Ok(())
}
