//! The `coattain template` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use coattain_core::parser::render_run_template;
use coattain_core::report::write_atomic;

pub fn execute(documents: Vec<String>, name: String, output: Option<PathBuf>) -> Result<()> {
    // Documents are looked up by bare file name at run time
    let names: Vec<String> = documents
        .iter()
        .map(|d| {
            Path::new(d)
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| d.clone())
        })
        .collect();

    let rendered = render_run_template(&name, &names);

    match output {
        Some(path) => {
            write_atomic(&path, rendered.as_bytes())?;
            eprintln!("Template written to: {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
