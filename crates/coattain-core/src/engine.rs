//! Attainment pipeline orchestrator.
//!
//! Reads each document in order through a `TextSource`, aggregates marks
//! and header fields, runs the attainment engine, and assembles the report.
//! Runs are synchronous; a document that cannot be read aborts the run.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use uuid::Uuid;

use crate::aggregate::{Aggregator, DocumentSummary};
use crate::attainment::{compute_attainment, AttainmentPolicy};
use crate::config::CoattainConfig;
use crate::error::RunError;
use crate::model::{DocumentRef, FieldLabels};
use crate::parser::RunSpec;
use crate::report::{AttainmentReport, RunSummary};
use crate::traits::TextSource;

/// Everything a run needs besides its inputs.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Directory document names are resolved against.
    pub document_dir: PathBuf,
    pub labels: FieldLabels,
    pub policy: AttainmentPolicy,
    pub institution: Option<String>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::from_config(&CoattainConfig::default())
    }
}

impl RunContext {
    pub fn from_config(config: &CoattainConfig) -> Self {
        Self {
            document_dir: config.document_dir.clone(),
            labels: config.fields.clone(),
            policy: config.policy.clone(),
            institution: config.institution.clone(),
        }
    }

    pub fn with_document_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.document_dir = dir.into();
        self
    }

    fn resolve(&self, name: &str) -> DocumentRef {
        DocumentRef::new(name, self.document_dir.join(name))
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_document_start(&self, index: usize, total: usize, document: &str);
    fn on_document_complete(&self, summary: &DocumentSummary);
    fn on_run_complete(&self, report: &AttainmentReport, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_document_start(&self, _: usize, _: usize, _: &str) {}
    fn on_document_complete(&self, _: &DocumentSummary) {}
    fn on_run_complete(&self, _: &AttainmentReport, _: Duration) {}
}

/// The attainment pipeline.
pub struct Pipeline {
    source: Arc<dyn TextSource>,
    context: RunContext,
}

impl Pipeline {
    pub fn new(source: Arc<dyn TextSource>, context: RunContext) -> Self {
        Self { source, context }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Run a parsed run file end to end.
    pub fn run(&self, spec: &RunSpec, progress: &dyn ProgressReporter) -> Result<AttainmentReport> {
        let start = Instant::now();

        if spec.students.is_empty() {
            return Err(RunError::MissingStudents.into());
        }
        if spec.weights.is_empty() {
            return Err(RunError::MissingWeights.into());
        }
        if spec.documents.is_empty() {
            return Err(RunError::MissingDocuments.into());
        }
        let mut seen_documents = HashSet::new();
        for name in &spec.documents {
            if !seen_documents.insert(name.as_str()) {
                return Err(RunError::DuplicateDocument(name.clone()).into());
            }
        }

        let students = dedup_students(&spec.students);
        let mut aggregator = Aggregator::new(students.clone(), self.context.labels.clone());

        let total = spec.documents.len();
        for (index, name) in spec.documents.iter().enumerate() {
            progress.on_document_start(index, total, name);
            let document = self.context.resolve(name);

            let lines = self.source.extract_lines(&document).map_err(|e| {
                tracing::error!("reading {} failed: {e:#}", document.path.display());
                RunError::DocumentUnreadable {
                    document: name.clone(),
                    reason: format!("{e:#}"),
                }
            })?;

            let summary = aggregator.ingest(name, &lines);
            tracing::info!(
                "{}: {} lines, {}/{} marks found",
                name,
                summary.line_count,
                summary.marks_found,
                students.len()
            );
            progress.on_document_complete(&summary);
        }

        let (marks, metadata) = aggregator.finish();
        let outcome = compute_attainment(&marks, &spec.weights, &self.context.policy);

        let elapsed = start.elapsed();
        let report = AttainmentReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            run: RunSummary {
                name: spec.name.clone(),
                description: spec.description.clone(),
                documents: spec.documents.clone(),
                student_count: students.len(),
            },
            institution: self.context.institution.clone(),
            metadata,
            marks,
            weights: spec.weights.clone(),
            weight_totals: spec.weights.with_row_totals(),
            attainment: outcome.students,
            cohort: outcome.cohort,
            policy: self.context.policy.clone(),
            duration_ms: elapsed.as_millis() as u64,
        };

        progress.on_run_complete(&report, elapsed);
        Ok(report)
    }
}

/// Drop repeated identifiers, keeping the first occurrence's position.
fn dedup_students(students: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(students.len());
    for s in students {
        if seen.insert(s.as_str()) {
            out.push(s.clone());
        } else {
            tracing::warn!("duplicate registration number '{s}' ignored");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attainment::AttainmentLevel;
    use crate::model::{ComponentWeights, CourseOutcome, MarkEntry, WeightTable};
    use crate::traits::MemorySource;
    use std::sync::Mutex;

    const CT1: &str = "\
SRM Institute of Science and Technology
Program Section: B.Tech CSE - A
Subject Code & Title: 18CSC301 Formal Languages
Test Name: Cycle Test 1
1 RA001 10
2 RA003 AB";

    const CT2: &str = "\
Test Name: Cycle Test 2
1 RA001 20
2 RA002 15";

    fn spec(documents: &[&str], students: &[&str]) -> RunSpec {
        RunSpec {
            name: "test run".into(),
            description: String::new(),
            documents: documents.iter().map(|s| s.to_string()).collect(),
            students: students.iter().map(|s| s.to_string()).collect(),
            weights: WeightTable::new(vec![
                ComponentWeights::from_slice("ct1.pdf", &[5.0, 5.0, 0.0, 0.0, 0.0, 0.0]).unwrap(),
                ComponentWeights::from_slice("ct2.pdf", &[0.0, 10.0, 10.0, 0.0, 0.0, 0.0])
                    .unwrap(),
            ])
            .unwrap(),
        }
    }

    fn pipeline() -> Pipeline {
        let source = MemorySource::new()
            .with_document("ct1.pdf", CT1)
            .with_document("ct2.pdf", CT2);
        Pipeline::new(Arc::new(source), RunContext::default())
    }

    #[test]
    fn end_to_end_run() {
        let report = pipeline()
            .run(
                &spec(&["ct1.pdf", "ct2.pdf"], &["RA001", "RA002", "RA003"]),
                &NoopReporter,
            )
            .unwrap();

        assert_eq!(report.run.student_count, 3);
        assert_eq!(report.marks.get("RA001", "ct2.pdf"), Some(&MarkEntry::Found("20".into())));
        assert_eq!(report.marks.get("RA002", "ct1.pdf"), Some(&MarkEntry::NotFound));
        assert_eq!(report.marks.get("RA003", "ct1.pdf"), Some(&MarkEntry::Found("AB".into())));
        assert_eq!(report.metadata.test_name.as_deref(), Some("Test Name: Cycle Test 1"));

        // RA001: ct1 100% -> CO1 5, CO2 5; ct2 100% -> CO2 10, CO3 10
        assert_eq!(report.attainment[0].attainment.0, [5.0, 15.0, 10.0, 0.0, 0.0, 0.0]);
        // RA002: ct2 75% -> CO2 7.5, CO3 7.5
        assert_eq!(report.attainment[1].attainment.0, [0.0, 7.5, 7.5, 0.0, 0.0, 0.0]);
        assert_eq!(report.attainment[2].attainment.0, [0.0; 6]);

        let co2 = report.cohort.get(CourseOutcome::Co2).unwrap();
        assert_eq!(co2.total_possible, 15.0);
        assert_eq!(co2.target, 11.25);
        assert_eq!(co2.count_above_target, 1);
        assert_eq!(co2.level, AttainmentLevel::Zero);
        assert_eq!(report.weight_totals[1].row_total, 20.0);
    }

    #[test]
    fn unreadable_document_aborts_run() {
        let err = pipeline()
            .run(&spec(&["ct1.pdf", "missing.pdf"], &["RA001"]), &NoopReporter)
            .unwrap_err();
        match err.downcast_ref::<RunError>() {
            Some(RunError::DocumentUnreadable { document, .. }) => {
                assert_eq!(document, "missing.pdf")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_inputs_fail_before_reading() {
        let err = pipeline()
            .run(&spec(&["ct1.pdf"], &[]), &NoopReporter)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::MissingStudents)
        ));
    }

    #[test]
    fn duplicate_documents_are_rejected_before_reading() {
        let source = Arc::new(MemorySource::new().with_document("ct1.pdf", CT1));
        let pipeline = Pipeline::new(source, RunContext::default());
        let spec = RunSpec {
            name: "dup".into(),
            description: String::new(),
            documents: vec!["ct1.pdf".into(), "ct1.pdf".into()],
            students: vec!["RA001".into()],
            weights: WeightTable::new(vec![ComponentWeights::from_slice(
                "ct1.pdf",
                &[10.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            )
            .unwrap()])
            .unwrap(),
        };

        let err = pipeline.run(&spec, &NoopReporter).unwrap_err();
        match err.downcast_ref::<RunError>() {
            Some(RunError::DuplicateDocument(name)) => assert_eq!(name, "ct1.pdf"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_students_collapse() {
        let report = pipeline()
            .run(&spec(&["ct1.pdf"], &["RA001", "RA001", "RA002"]), &NoopReporter)
            .unwrap();
        assert_eq!(report.marks.students(), &["RA001".to_string(), "RA002".to_string()]);
        assert_eq!(report.cohort.student_count, 2);
    }

    #[test]
    fn document_paths_resolve_against_context_dir() {
        struct Recording(Mutex<Vec<PathBuf>>);
        impl TextSource for Recording {
            fn name(&self) -> &str {
                "recording"
            }
            fn extract_lines(&self, document: &DocumentRef) -> Result<Vec<String>> {
                self.0.lock().unwrap().push(document.path.clone());
                Ok(vec![])
            }
        }

        let source = Arc::new(Recording(Mutex::new(Vec::new())));
        let pipeline = Pipeline::new(
            source.clone(),
            RunContext::default().with_document_dir("/data/uploads"),
        );
        pipeline
            .run(&spec(&["ct1.pdf", "ct2.pdf"], &["RA001"]), &NoopReporter)
            .unwrap();

        let seen = source.0.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                PathBuf::from("/data/uploads/ct1.pdf"),
                PathBuf::from("/data/uploads/ct2.pdf")
            ]
        );
    }

    #[test]
    fn progress_is_reported_per_document() {
        struct Counting(Mutex<(usize, usize, usize)>);
        impl ProgressReporter for Counting {
            fn on_document_start(&self, _: usize, _: usize, _: &str) {
                self.0.lock().unwrap().0 += 1;
            }
            fn on_document_complete(&self, _: &DocumentSummary) {
                self.0.lock().unwrap().1 += 1;
            }
            fn on_run_complete(&self, _: &AttainmentReport, _: Duration) {
                self.0.lock().unwrap().2 += 1;
            }
        }

        let counter = Counting(Mutex::new((0, 0, 0)));
        pipeline()
            .run(&spec(&["ct1.pdf", "ct2.pdf"], &["RA001"]), &counter)
            .unwrap();
        assert_eq!(*counter.0.lock().unwrap(), (2, 2, 1));
    }

    #[test]
    fn repeated_runs_compute_the_same_tables() {
        let p = pipeline();
        let s = spec(&["ct1.pdf", "ct2.pdf"], &["RA001", "RA002", "RA003"]);
        let a = p.run(&s, &NoopReporter).unwrap();
        let b = p.run(&s, &NoopReporter).unwrap();
        assert_eq!(a.marks, b.marks);
        assert_eq!(a.attainment, b.attainment);
        assert_eq!(a.cohort, b.cohort);
        assert_ne!(a.id, b.id);
    }
}
