//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined: a marks
//! section and an attainment section, in that order.

use anyhow::Result;
use std::path::Path;

use coattain_core::attainment::CoSummary;
use coattain_core::model::{display_name, CourseOutcome, MetadataField};
use coattain_core::report::{write_atomic, AttainmentReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an attainment report.
pub fn generate_html(report: &AttainmentReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>CO attainment: {}</title>\n",
        html_escape(&report.run.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str(&header_block(report));
    html.push_str(&marks_section(report));
    html.push_str(&attainment_section(report));

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AttainmentReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    write_atomic(path, html.as_bytes())
}

fn header_block(report: &AttainmentReport) -> String {
    let mut out = String::from("<header>\n");

    match &report.institution {
        Some(name) => out.push_str(&format!("<h1>{}</h1>\n", html_escape(name))),
        None => out.push_str("<h1>CO attainment report</h1>\n"),
    }
    for field in MetadataField::ALL {
        if let Some(value) = report.metadata.get(field) {
            out.push_str(&format!("<p class=\"field\">{}</p>\n", html_escape(value)));
        }
    }
    out.push_str(&format!(
        "<p class=\"meta\">Run: <strong>{}</strong> | {} students | {} components | {}</p>\n",
        html_escape(&report.run.name),
        report.run.student_count,
        report.run.documents.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if !report.run.description.is_empty() {
        out.push_str(&format!(
            "<p class=\"meta\">{}</p>\n",
            html_escape(&report.run.description)
        ));
    }

    out.push_str("</header>\n");
    out
}

fn co_header_cells() -> String {
    CourseOutcome::ALL
        .iter()
        .map(|co| format!("<th>{co}</th>"))
        .collect()
}

fn marks_section(report: &AttainmentReport) -> String {
    let mut out = String::from("<section class=\"marks\">\n<h2>Marks</h2>\n");

    out.push_str("<table id=\"marks\">\n<thead><tr><th onclick=\"sortTable('marks', 0)\">Reg. No.</th>");
    for (i, component) in report.marks.components().iter().enumerate() {
        out.push_str(&format!(
            "<th onclick=\"sortTable('marks', {})\">{}</th>",
            i + 1,
            html_escape(display_name(component))
        ));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for (student, row) in report.marks.rows() {
        out.push_str(&format!("<tr><td>{}</td>", html_escape(student)));
        for entry in row {
            let class = if entry.is_found() { "" } else { " class=\"missing\"" };
            out.push_str(&format!("<td{class}>{}</td>", html_escape(&entry.to_string())));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody></table>\n</section>\n");
    out
}

fn attainment_section(report: &AttainmentReport) -> String {
    let mut out = String::from("<section class=\"attainment\">\n<h2>Attainment</h2>\n");

    // Weight table
    out.push_str("<h3>Weights</h3>\n<table class=\"weights\">\n<thead><tr><th>Component</th>");
    out.push_str(&co_header_cells());
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in report.weights.rows() {
        out.push_str(&format!(
            "<tr><td>{}</td>",
            html_escape(display_name(&row.component))
        ));
        for (_, w) in row.weights.iter() {
            out.push_str(&format!("<td>{w:.2}</td>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody></table>\n");

    // Attainment table plus the cohort rows beneath it
    out.push_str("<h3>Attainment table</h3>\n<table id=\"attainment\">\n<thead><tr><th>Reg. No.</th>");
    out.push_str(&co_header_cells());
    out.push_str("</tr></thead>\n<tbody>\n");
    for student in &report.attainment {
        out.push_str(&format!("<tr><td>{}</td>", html_escape(&student.student)));
        for (_, value) in student.attainment.iter() {
            out.push_str(&format!("<td>{value:.2}</td>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n<tfoot>\n");
    out.push_str(&summary_row(report, "Total Possible Attainment", |s| {
        format!("{:.2}", s.total_possible)
    }));
    out.push_str(&summary_row(report, "Target", |s| format!("{:.2}", s.target)));
    out.push_str(&summary_row(report, "No of students > Target", |s| {
        s.count_above_target.to_string()
    }));
    out.push_str(&summary_row(report, "% of students > Target", |s| {
        format!("{:.2}%", s.percent_above_target)
    }));
    out.push_str(&summary_row(report, "Attainment Level", |s| {
        s.level.to_string()
    }));
    out.push_str("</tfoot></table>\n");

    out.push_str(&format!(
        "<p class=\"legend\">{}</p>\n",
        html_escape(&report.policy.legend())
    ));
    out.push_str(&format!(
        "<p class=\"average\">Average of all CO attainment levels: <strong>{:.2}</strong></p>\n",
        report.cohort.average_level
    ));

    out.push_str("</section>\n");
    out
}

fn summary_row(
    report: &AttainmentReport,
    label: &str,
    cell: impl Fn(&CoSummary) -> String,
) -> String {
    let mut row = format!("<tr class=\"summary\"><th>{}</th>", html_escape(label));
    for summary in &report.cohort.per_co {
        row.push_str(&format!("<td>{}</td>", cell(summary)));
    }
    row.push_str("</tr>\n");
    row
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --missing: #fde2e2; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --missing: #7f1d1d; --muted: #9ca3af; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .legend { color: var(--muted); }
.field { margin: 0.25rem 0; font-weight: 600; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
thead th { background: var(--border); cursor: pointer; }
tfoot th { text-align: left; }
.missing { background: var(--missing); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
