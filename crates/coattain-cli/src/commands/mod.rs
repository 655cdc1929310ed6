pub mod compare;
pub mod init;
pub mod run;
pub mod show;
pub mod template;
pub mod validate;

use comfy_table::{Cell, Table};

use coattain_core::attainment::CoSummary;
use coattain_core::model::CourseOutcome;
use coattain_core::report::AttainmentReport;

/// Cohort summary as a terminal table: one column per CO.
pub fn summary_table(report: &AttainmentReport) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("")];
    header.extend(CourseOutcome::ALL.iter().map(Cell::new));
    table.set_header(header);

    let rows: [(&str, fn(&CoSummary) -> String); 5] = [
        ("Total Possible", |s| format!("{:.2}", s.total_possible)),
        ("Target", |s| format!("{:.2}", s.target)),
        ("Students > Target", |s| s.count_above_target.to_string()),
        ("% > Target", |s| format!("{:.2}%", s.percent_above_target)),
        ("Level", |s| s.level.to_string()),
    ];
    for (label, cell) in rows {
        let mut row = vec![Cell::new(label)];
        row.extend(report.cohort.per_co.iter().map(|s| Cell::new(cell(s))));
        table.add_row(row);
    }

    table
}

/// Per-student attainment as a terminal table.
pub fn student_table(report: &AttainmentReport) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("Reg. No.")];
    header.extend(CourseOutcome::ALL.iter().map(Cell::new));
    table.set_header(header);

    for student in &report.attainment {
        let mut row = vec![Cell::new(&student.student)];
        row.extend(
            student
                .attainment
                .iter()
                .map(|(_, v)| Cell::new(format!("{v:.2}"))),
        );
        table.add_row(row);
    }

    table
}
