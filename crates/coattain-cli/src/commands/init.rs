//! The `coattain init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create coattain.toml
    if std::path::Path::new("coattain.toml").exists() {
        println!("coattain.toml already exists, skipping.");
    } else {
        std::fs::write("coattain.toml", SAMPLE_CONFIG)?;
        println!("Created coattain.toml");
    }

    // Create example run file
    std::fs::create_dir_all("runs")?;
    let example_path = std::path::Path::new("runs/example.toml");
    if example_path.exists() {
        println!("runs/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_RUN)?;
        println!("Created runs/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Put the mark-report PDFs in ./uploads");
    println!("  2. Edit runs/example.toml with your documents, students and weights");
    println!("  3. Run: coattain validate --spec runs/example.toml");
    println!("  4. Run: coattain run --spec runs/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# coattain configuration

document_dir = "./uploads"
output_dir = "./results"
institution = "SRM Institute of Science and Technology"
default_format = "json,html"

[fields]
program_section = "Program Section:"
subject_code_title = "Subject Code & Title:"
test_name = "Test Name:"

[policy]
target_ratio = 0.75
level_3_min_percent = 80.0
level_2_min_percent = 70.0
level_1_min_percent = 60.0
"#;

const EXAMPLE_RUN: &str = r#"[run]
name = "Example attainment run"
description = "Two cycle tests mapped onto CO1..CO3"
documents = ["ct1.pdf", "ct2.pdf"]
students = ["RA2011003010001", "RA2011003010002", "RA2011003010003"]
# students_file = "students.txt"

# ct1
[[components]]
name = "ct1.pdf"
weights = [25, 25, 0, 0, 0, 0]  # CO1..CO6

# ct2
[[components]]
name = "ct2.pdf"
weights = [0, 0, 50, 0, 0, 0]  # CO1..CO6
"#;
