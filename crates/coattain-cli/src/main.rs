//! coattain CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "coattain",
    version,
    about = "Course Outcome attainment from assessment-mark reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract marks and compute CO attainment for a run
    Run {
        /// Path to the .toml run file
        #[arg(long)]
        spec: PathBuf,

        /// Directory the run's documents are read from (default: config document_dir)
        #[arg(long)]
        documents: Option<PathBuf>,

        /// Output directory (default: config output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, md, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Document reader: auto, pdf, text
        #[arg(long, default_value = "auto")]
        source: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a run file without reading any documents
    Validate {
        /// Path to the .toml run file
        #[arg(long)]
        spec: PathBuf,
    },

    /// Write a blank run file for a set of documents
    Template {
        /// Document file names, in processing order
        #[arg(required = true)]
        documents: Vec<String>,

        /// Run name
        #[arg(long, default_value = "attainment run")]
        name: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the summary of a saved JSON report
    Show {
        /// Report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Also print the per-student attainment table
        #[arg(long)]
        students: bool,
    },

    /// Compare two saved reports per CO
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if any CO level dropped
        #[arg(long)]
        fail_on_drop: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example run file
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("coattain=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            spec,
            documents,
            output,
            format,
            source,
            config,
        } => commands::run::execute(spec, documents, output, format, source, config),
        Commands::Validate { spec } => commands::validate::execute(spec),
        Commands::Template {
            documents,
            name,
            output,
        } => commands::template::execute(documents, name, output),
        Commands::Show {
            report,
            format,
            students,
        } => commands::show::execute(report, format, students),
        Commands::Compare {
            baseline,
            current,
            fail_on_drop,
            format,
        } => commands::compare::execute(baseline, current, fail_on_drop, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
