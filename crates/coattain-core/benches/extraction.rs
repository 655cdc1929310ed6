use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coattain_core::extract::{extract_fields, extract_marks};
use coattain_core::model::FieldLabels;
use coattain_core::parser::parse_run_spec_str;

fn make_report_lines(students: usize) -> (Vec<String>, Vec<String>) {
    let mut lines = vec![
        "SRM Institute of Science and Technology".to_string(),
        "Program Section: B.Tech CSE - A".to_string(),
        "Subject Code & Title: 18CSC301 Formal Languages".to_string(),
        "Test Name: Cycle Test 1".to_string(),
        "S.No Register Number Name Marks".to_string(),
    ];
    let mut ids = Vec::with_capacity(students);
    for i in 0..students {
        let id = format!("RA2111003010{i:03}");
        lines.push(format!("{} {} {}", i + 1, id, (i * 7) % 50));
        ids.push(id);
    }
    (lines, ids)
}

fn bench_extract_marks(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_marks");

    for students in [60, 240, 1000] {
        let (lines, ids) = make_report_lines(students);
        group.bench_function(format!("students={students}"), |b| {
            b.iter(|| extract_marks(black_box(&lines), black_box(&ids)))
        });
    }

    group.finish();
}

fn bench_extract_fields(c: &mut Criterion) {
    let (lines, _) = make_report_lines(240);
    let labels = FieldLabels::default();
    c.bench_function("extract_fields", |b| {
        b.iter(|| extract_fields(black_box(&lines), &labels))
    });
}

fn bench_run_spec_parsing(c: &mut Criterion) {
    let toml = make_run_toml(12, 240);
    c.bench_function("parse_run_spec", |b| {
        b.iter(|| parse_run_spec_str(black_box(&toml), std::path::Path::new("bench.toml")))
    });
}

fn make_run_toml(components: usize, students: usize) -> String {
    let docs: Vec<String> = (0..components).map(|i| format!("\"ct{i}.pdf\"")).collect();
    let ids: Vec<String> = (0..students).map(|i| format!("\"RA{i:05}\"")).collect();
    let mut s = format!(
        "[run]\nname = \"bench\"\ndocuments = [{}]\nstudents = [{}]\n",
        docs.join(", "),
        ids.join(", ")
    );
    for i in 0..components {
        s.push_str(&format!(
            "\n[[components]]\nname = \"ct{i}.pdf\"\nweights = [5, 5, 0, 0, 0, {i}]\n"
        ));
    }
    s
}

criterion_group!(
    benches,
    bench_extract_marks,
    bench_extract_fields,
    bench_run_spec_parsing
);
criterion_main!(benches);
