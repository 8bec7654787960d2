//! PDF signing entry point
//!
//! Adds a visible signature with a QR stamp through pyHanko. Prints the
//! signing outcome as JSON on stdout. Diagnostics and logs go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use shared_pdf::LopdfInspector;
use stamp_core::{
    sign_document, ProcessTool, PyHankoBackend, SignConfig, SignError, SignJob, SignOutcome,
};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser)]
#[command(name = "sign-pdf")]
#[command(version, about = "Add a visible digital signature with a QR stamp to a PDF")]
struct Cli {
    /// PKCS#12 certificate of the signer
    #[arg(value_name = "CERT_P12")]
    certificate: PathBuf,

    /// Password of the PKCS#12 file
    #[arg(value_name = "PASSWORD", allow_hyphen_values = true)]
    password: String,

    #[arg(value_name = "INPUT_PDF")]
    input: PathBuf,

    #[arg(value_name = "OUTPUT_PDF")]
    output: PathBuf,

    /// Page number, one-based or zero-based
    #[arg(value_name = "PAGE", allow_hyphen_values = true)]
    page: String,

    #[arg(value_name = "X1", allow_hyphen_values = true)]
    x1: String,

    #[arg(value_name = "Y1", allow_hyphen_values = true)]
    y1: String,

    #[arg(value_name = "X2", allow_hyphen_values = true)]
    x2: String,

    #[arg(value_name = "Y2", allow_hyphen_values = true)]
    y2: String,

    /// CA certificate embedded next to the signer certificate
    #[arg(value_name = "CA_CERT_PEM")]
    ca_certificate: PathBuf,

    /// pyHanko executable
    #[arg(long, env = "PDFSIGN_PYHANKO", default_value = "pyhanko")]
    pyhanko: PathBuf,

    /// OpenSSL executable used to read the certificate subject
    #[arg(long, env = "PDFSIGN_OPENSSL", default_value = "openssl")]
    openssl: PathBuf,

    /// Timeout for each external tool invocation, in seconds
    #[arg(long, env = "PDFSIGN_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Fail when page geometry cannot be read instead of signing unchecked
    #[arg(long, env = "PDFSIGN_REQUIRE_PAGE_GEOMETRY")]
    require_page_geometry: bool,
}

impl Cli {
    fn job(&self) -> SignJob {
        SignJob {
            certificate: self.certificate.clone(),
            password: self.password.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            page: self.page.clone(),
            x1: self.x1.clone(),
            y1: self.y1.clone(),
            x2: self.x2.clone(),
            y2: self.y2.clone(),
            ca_certificate: Some(self.ca_certificate.clone()),
        }
    }
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

    // stdout carries the JSON outcome only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match sign(&cli) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(kind = e.kind(), "Signing failed");
            eprintln!("error[{}]: {}", e.kind(), e);
            return ExitCode::FAILURE;
        }
    };

    match emit(&outcome) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn sign(cli: &Cli) -> Result<SignOutcome, SignError> {
    let backend = PyHankoBackend::new(ProcessTool)
        .with_pyhanko(&cli.pyhanko)
        .with_openssl(&cli.openssl)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let config = SignConfig {
        require_page_geometry: cli.require_page_geometry,
    };

    tracing::info!(input = %cli.input.display(), output = %cli.output.display(), "Signing PDF");
    let outcome = sign_document(&cli.job(), &config, &backend, &LopdfInspector)?;
    tracing::info!(field_name = %outcome.field_name, page_index = outcome.page_index, "PDF signed");
    Ok(outcome)
}

fn emit(outcome: &SignOutcome) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("Cannot serialize signing outcome")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json).context("Cannot write signing outcome")?;
    Ok(())
}
