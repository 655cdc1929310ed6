//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CT1: &str = "\
SRM Institute of Science and Technology
Program Section: B.Tech CSE - A
Subject Code & Title: 18CSC301 Formal Languages
Test Name: Cycle Test 1
S.No Reg. No. Marks
1 RA001 10
2 RA003 AB
";

const CT2: &str = "\
Test Name: Cycle Test 2
1 RA001 20
2 RA002 15
";

const RUN_TOML: &str = r#"
[run]
name = "Formal Languages CTs"
documents = ["ct1.txt", "ct2.txt"]
students = ["RA001", "RA002", "RA003"]

[[components]]
name = "ct1.txt"
weights = [5, 5, 0, 0, 0, 0]

[[components]]
name = "ct2.txt"
weights = [0, 10, 10, 0, 0, 0]
"#;

fn coattain(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("coattain").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("COATTAIN_OUTPUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// A workspace with two text mark reports under `uploads/` and a run file.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let uploads = dir.path().join("uploads");
    std::fs::create_dir_all(&uploads).unwrap();
    std::fs::write(uploads.join("ct1.txt"), CT1).unwrap();
    std::fs::write(uploads.join("ct2.txt"), CT2).unwrap();
    std::fs::write(dir.path().join("run.toml"), RUN_TOML).unwrap();
    dir
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    files
}

fn run_to(dir: &Path, out: &str) -> serde_json::Value {
    coattain(dir)
        .args(["run", "--spec", "run.toml", "--output", out, "--format", "json"])
        .assert()
        .success();
    let reports = files_with_extension(&dir.join(out), "json");
    assert_eq!(reports.len(), 1);
    serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap()
}

#[test]
fn validate_valid_run_file() {
    let dir = workspace();
    coattain(dir.path())
        .args(["validate", "--spec", "run.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 documents, 3 students"))
        .stdout(predicate::str::contains("Run file valid."));
}

#[test]
fn validate_reports_unscored_document() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("partial.toml"),
        r#"
[run]
name = "partial"
documents = ["ct1.txt", "ct2.txt"]
students = ["RA001"]

[[components]]
name = "ct1.txt"
weights = [5, 5, 0, 0, 0, 0]
"#,
    )
    .unwrap();

    coattain(dir.path())
        .args(["validate", "--spec", "partial.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ct2.txt] WARNING"))
        .stdout(predicate::str::contains("will not be scored"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    coattain(dir.path())
        .args(["validate", "--spec", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_rejects_missing_students() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("empty.toml"),
        r#"
[run]
name = "empty"
documents = ["ct1.txt"]
students = []

[[components]]
name = "ct1.txt"
weights = [5, 5, 0, 0, 0, 0]
"#,
    )
    .unwrap();

    coattain(dir.path())
        .args(["validate", "--spec", "empty.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no registration numbers provided"));
}

#[test]
fn run_writes_all_artifacts() {
    let dir = workspace();
    coattain(dir.path())
        .args(["run", "--spec", "run.toml", "--output", "out", "--format", "all"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[1/2] Reading: ct1.txt"))
        .stderr(predicate::str::contains("Results saved to:"))
        .stderr(predicate::str::contains("HTML report:"))
        .stderr(predicate::str::contains("Markdown summary:"));

    let out = dir.path().join("out");
    assert_eq!(files_with_extension(&out, "json").len(), 1);
    assert_eq!(files_with_extension(&out, "md").len(), 1);

    let html = files_with_extension(&out, "html");
    assert_eq!(html.len(), 1);
    let html = std::fs::read_to_string(&html[0]).unwrap();
    assert!(html.contains("Test Name: Cycle Test 1"));
    assert!(html.contains("<td>AB</td>"));
}

#[test]
fn run_computes_attainment() {
    let dir = workspace();
    let report = run_to(dir.path(), "out");

    assert_eq!(report["run"]["student_count"], 3);
    assert_eq!(
        report["metadata"]["program_section"],
        "Program Section: B.Tech CSE - A"
    );

    // RA001: ct1 100% -> CO1 5, CO2 5; ct2 100% -> CO2 10, CO3 10
    let ra001 = &report["attainment"][0];
    assert_eq!(ra001["student"], "RA001");
    assert_eq!(ra001["attainment"][1], 15.0);

    let co2 = &report["cohort"]["per_co"][1];
    assert_eq!(co2["total_possible"], 15.0);
    assert_eq!(co2["target"], 11.25);
    assert_eq!(co2["count_above_target"], 1);
    assert_eq!(co2["level"], 0);
}

#[test]
fn run_resolves_documents_against_flag() {
    let dir = workspace();
    std::fs::rename(dir.path().join("uploads"), dir.path().join("reports")).unwrap();

    coattain(dir.path())
        .args([
            "run",
            "--spec",
            "run.toml",
            "--documents",
            "reports",
            "--output",
            "out",
            "--format",
            "md",
        ])
        .assert()
        .success();
    assert_eq!(files_with_extension(&dir.path().join("out"), "md").len(), 1);
}

#[test]
fn run_uses_config_output_dir() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("coattain.toml"),
        "output_dir = \"./from-config\"\ndefault_format = \"json\"\n",
    )
    .unwrap();

    coattain(dir.path())
        .args(["run", "--spec", "run.toml"])
        .assert()
        .success();
    assert_eq!(
        files_with_extension(&dir.path().join("from-config"), "json").len(),
        1
    );
}

#[test]
fn run_with_missing_document_writes_nothing() {
    let dir = workspace();
    std::fs::remove_file(dir.path().join("uploads").join("ct2.txt")).unwrap();

    coattain(dir.path())
        .args(["run", "--spec", "run.toml", "--output", "out", "--format", "all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read document 'ct2.txt'"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn run_rejects_unknown_format() {
    let dir = workspace();
    coattain(dir.path())
        .args(["run", "--spec", "run.toml", "--format", "xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}

#[test]
fn template_prints_blank_weights() {
    let dir = TempDir::new().unwrap();
    coattain(dir.path())
        .args(["template", "uploads/ct1.pdf", "ct2.pdf", "--name", "CT weights"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name = \"CT weights\""))
        .stdout(predicate::str::contains("# ct1\n"))
        .stdout(predicate::str::contains("name = \"ct1.pdf\""))
        .stdout(predicate::str::contains("weights = [0, 0, 0, 0, 0, 0]"));
}

#[test]
fn template_to_file() {
    let dir = TempDir::new().unwrap();
    coattain(dir.path())
        .args(["template", "ct1.pdf", "--output", "runs/new.toml"])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("runs/new.toml")).unwrap();
    assert!(content.contains("[[components]]"));
}

#[test]
fn show_prints_summary() {
    let dir = workspace();
    run_to(dir.path(), "out");
    let report = files_with_extension(&dir.path().join("out"), "json").remove(0);

    coattain(dir.path())
        .args(["show", "--students", "--report"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Formal Languages CTs"))
        .stdout(predicate::str::contains("RA002"))
        .stdout(predicate::str::contains("11.25"))
        .stdout(predicate::str::contains("Average of all CO attainment levels: 0.00"));
}

#[test]
fn compare_identical_runs() {
    let dir = workspace();
    run_to(dir.path(), "a");
    run_to(dir.path(), "b");
    let a = files_with_extension(&dir.path().join("a"), "json").remove(0);
    let b = files_with_extension(&dir.path().join("b"), "json").remove(0);

    coattain(dir.path())
        .args(["compare", "--fail-on-drop", "--baseline"])
        .arg(&a)
        .arg("--current")
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 level drop(s)"));
}

#[test]
fn compare_fails_on_level_drop() {
    let dir = workspace();
    let mut baseline = run_to(dir.path(), "a");
    baseline["cohort"]["per_co"][0]["level"] = 3.into();
    let baseline_path = dir.path().join("baseline.json");
    std::fs::write(&baseline_path, serde_json::to_string(&baseline).unwrap()).unwrap();
    let current = files_with_extension(&dir.path().join("a"), "json").remove(0);

    coattain(dir.path())
        .args(["compare", "--fail-on-drop", "--baseline"])
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current)
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 level drop(s)"))
        .stdout(predicate::str::contains("CO1: level 3 -> 0"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    coattain(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created coattain.toml"))
        .stdout(predicate::str::contains("Created runs/example.toml"));

    assert!(dir.path().join("coattain.toml").exists());

    coattain(dir.path())
        .args(["validate", "--spec", "runs/example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run file valid."));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    coattain(dir.path()).arg("init").assert().success();

    coattain(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));
}
