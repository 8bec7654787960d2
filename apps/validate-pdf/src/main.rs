//! PDF validation entry point
//!
//! Prints a JSON report describing the signature evidence in a PDF. The
//! report is always well-formed, even when the file cannot be parsed.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use evidence_core::{EvidenceClassifier, MarkerVocabulary};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "validate-pdf")]
#[command(version, about = "Report the signature evidence found in a PDF")]
struct Cli {
    /// PDF to inspect
    pdf_path: PathBuf,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only scan for byte markers, skip signature field enumeration
    #[arg(long, env = "PDFVALIDATE_HEURISTIC_ONLY")]
    heuristic_only: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if !cli.pdf_path.exists() {
        let missing = serde_json::json!({
            "error": format!("El archivo {} no existe", cli.pdf_path.display())
        });
        println!("{}", missing);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let vocabulary = MarkerVocabulary::default();
    let classifier = if cli.heuristic_only {
        EvidenceClassifier::heuristic_only(vocabulary)
    } else {
        EvidenceClassifier::new(vocabulary)
    };

    let report = classifier.validate_path(&cli.pdf_path);
    tracing::info!(
        path = %cli.pdf_path.display(),
        is_valid = report.is_valid,
        system_type = ?report.system_type(),
        "Validation finished"
    );
    let json = report
        .to_json_pretty()
        .context("Cannot serialize validation report")?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Cannot write report to {}", path.display()))?;
            tracing::info!(output = %path.display(), "Report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Cannot write report")?;
        }
    }
    Ok(())
}
