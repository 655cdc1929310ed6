//! The `coattain show` command.

use std::path::PathBuf;

use anyhow::Result;

use coattain_core::model::MetadataField;
use coattain_core::report::AttainmentReport;

pub fn execute(report_path: PathBuf, format: String, students: bool) -> Result<()> {
    let report = AttainmentReport::load_json(&report_path)?;

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        _ => {
            if let Some(institution) = &report.institution {
                println!("{institution}");
            }
            for field in MetadataField::ALL {
                if let Some(value) = report.metadata.get(field) {
                    println!("{value}");
                }
            }
            println!(
                "Run: {} | {} students | {} components | {}",
                report.run.name,
                report.run.student_count,
                report.run.documents.len(),
                report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );

            if students {
                println!("\n{}", super::student_table(&report));
            }
            println!("\n{}", super::summary_table(&report));
            println!(
                "Average of all CO attainment levels: {:.2}",
                report.cohort.average_level
            );
            println!("{}", report.policy.legend());
        }
    }

    Ok(())
}
