//! The `coattain validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(spec_path: PathBuf) -> Result<()> {
    let spec = coattain_core::parser::parse_run_spec(&spec_path)?;

    println!(
        "Run: {} ({} documents, {} students, {} weight rows)",
        spec.name,
        spec.documents.len(),
        spec.students.len(),
        spec.weights.len()
    );

    let warnings = coattain_core::parser::validate_run_spec(&spec);
    for w in &warnings {
        let prefix = w
            .component
            .as_ref()
            .map(|c| format!("  [{c}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Run file valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
