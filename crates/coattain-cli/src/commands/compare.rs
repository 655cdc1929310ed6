//! The `coattain compare` command.

use std::path::PathBuf;

use anyhow::Result;

use coattain_core::report::AttainmentReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_drop: bool,
    format: String,
) -> Result<()> {
    let baseline = AttainmentReport::load_json(&baseline_path)?;
    let current = AttainmentReport::load_json(&current_path)?;

    let report = current.compare(&baseline);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            let drops = report.level_drops().count();
            println!(
                "Comparison: {} -> {}: {} level drop(s), average level {:+.2}",
                report.baseline_name, report.current_name, drops, report.average_level_delta
            );

            for d in &report.per_co {
                let marker = if d.current_level < d.baseline_level {
                    " DROP"
                } else {
                    ""
                };
                println!(
                    "  {}: level {} -> {}, {:.2}% -> {:.2}% ({:+.2}%){}",
                    d.co,
                    d.baseline_level,
                    d.current_level,
                    d.baseline_percent,
                    d.current_percent,
                    d.delta_percent,
                    marker
                );
            }
        }
    }

    if fail_on_drop && report.has_level_drops() {
        std::process::exit(1);
    }

    Ok(())
}
