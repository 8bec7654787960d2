//! Cryptographic stamping backends

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use placement_core::NormalizedPlacement;
use shared_crypto::SubjectSummary;

use crate::error::SignError;
use crate::tool::{ExternalTool, ProcessTool, ToolCommand, ToolOutput, DEFAULT_TOOL_TIMEOUT};

/// Environment variable used to hand the PKCS#12 password to openssl
const PASSWORD_ENV: &str = "PDFSIGN_P12_PASSWORD";

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// What the signer's certificate says about them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerCredentials {
    pub subject: SubjectSummary,
}

/// Everything the backend needs to apply one signature
#[derive(Debug, Clone, Copy)]
pub struct StampRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub certificate: &'a Path,
    pub password: &'a str,
    pub ca_certificate: Option<&'a Path>,
    pub field_name: &'a str,
    pub placement: &'a NormalizedPlacement,
    pub qr_payload: &'a str,
}

pub trait SigningBackend {
    /// Open the PKCS#12 bundle and read the signer certificate
    fn load_credentials(
        &self,
        certificate: &Path,
        password: &str,
    ) -> Result<SignerCredentials, SignError>;

    /// Write a signed copy of `input` to `output`
    fn stamp(&self, request: &StampRequest<'_>) -> Result<(), SignError>;
}

/// Backend driving the `openssl` and `pyhanko` command-line tools
#[derive(Debug, Clone)]
pub struct PyHankoBackend<T = ProcessTool> {
    tool: T,
    pyhanko: PathBuf,
    openssl: PathBuf,
    timeout: Duration,
}

impl Default for PyHankoBackend<ProcessTool> {
    fn default() -> Self {
        Self::new(ProcessTool)
    }
}

impl<T: ExternalTool> PyHankoBackend<T> {
    pub fn new(tool: T) -> Self {
        Self {
            tool,
            pyhanko: PathBuf::from("pyhanko"),
            openssl: PathBuf::from("openssl"),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_pyhanko(mut self, program: impl Into<PathBuf>) -> Self {
        self.pyhanko = program.into();
        self
    }

    pub fn with_openssl(mut self, program: impl Into<PathBuf>) -> Self {
        self.openssl = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, SignError> {
        Ok(self.tool.invoke(command, self.timeout)?)
    }
}

impl<T: ExternalTool> SigningBackend for PyHankoBackend<T> {
    fn load_credentials(
        &self,
        certificate: &Path,
        password: &str,
    ) -> Result<SignerCredentials, SignError> {
        let command = ToolCommand::new(&self.openssl)
            .arg("pkcs12")
            .arg("-in")
            .arg(certificate)
            .arg("-nokeys")
            .arg("-clcerts")
            .arg("-passin")
            .arg(format!("env:{}", PASSWORD_ENV))
            .env(PASSWORD_ENV, password);

        let output = self.run(&command)?;
        if !output.success {
            return Err(SignError::CertificateLoadFailure(format!(
                "bad password or unsupported PKCS#12 file: {}",
                output.stderr.trim()
            )));
        }

        let pem = first_pem_certificate(&output.stdout).ok_or_else(|| {
            SignError::CertificateLoadFailure("no certificate in PKCS#12 file".to_string())
        })?;
        let subject = SubjectSummary::from_pem(pem)
            .map_err(|e| SignError::CertificateLoadFailure(e.to_string()))?;

        tracing::info!(
            common_name = subject.common_name.as_deref().unwrap_or(""),
            organization = subject.organization.as_deref().unwrap_or(""),
            "Loaded signer certificate"
        );
        Ok(SignerCredentials { subject })
    }

    fn stamp(&self, request: &StampRequest<'_>) -> Result<(), SignError> {
        let mut passfile = tempfile::NamedTempFile::new()
            .map_err(|e| SignError::UnexpectedFailure(format!("password file: {}", e)))?;
        passfile
            .write_all(request.password.as_bytes())
            .and_then(|_| passfile.flush())
            .map_err(|e| SignError::UnexpectedFailure(format!("password file: {}", e)))?;

        // Signed bytes land next to the output and replace it only on success
        let output_dir = match request.output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let staged = tempfile::Builder::new()
            .prefix(".signing-")
            .suffix(".pdf")
            .tempfile_in(output_dir)
            .map_err(|e| {
                SignError::UnexpectedFailure(format!(
                    "cannot create output in {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;

        let mut command = ToolCommand::new(&self.pyhanko)
            .arg("sign")
            .arg("addsig")
            .arg("--field")
            .arg(field_spec(request.placement, request.field_name))
            .arg("--stamp-url")
            .arg(request.qr_payload)
            .arg("pkcs12")
            .arg("--passfile")
            .arg(passfile.path());
        if let Some(ca) = request.ca_certificate {
            command = command.arg("--other-certs").arg(ca);
        }
        let command = command
            .arg(request.input)
            .arg(staged.path())
            .arg(request.certificate);

        let output = self.run(&command)?;
        if !output.success {
            return Err(SignError::ExternalToolFailure {
                program: command.program_name(),
                status: output.status_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let written = std::fs::metadata(staged.path()).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(SignError::ExternalToolFailure {
                program: command.program_name(),
                status: output.status_code,
                stderr: "no signed output was produced".to_string(),
            });
        }

        staged.persist(request.output).map_err(|e| {
            SignError::UnexpectedFailure(format!(
                "cannot write {}: {}",
                request.output.display(),
                e.error
            ))
        })?;

        tracing::info!(output = %request.output.display(), bytes = written, "Signed PDF written");
        Ok(())
    }
}

/// `PAGE/LLX,LLY,URX,URY/NAME` with a one-based page and whole points
fn field_spec(placement: &NormalizedPlacement, field_name: &str) -> String {
    let rect = placement.rect;
    format!(
        "{}/{},{},{},{}/{}",
        u64::from(placement.page_index) + 1,
        rect.llx.round() as i64,
        rect.lly.round() as i64,
        rect.urx.round() as i64,
        rect.ury.round() as i64,
        field_name
    )
}

/// First PEM certificate block, skipping openssl's bag attributes
fn first_pem_certificate(text: &str) -> Option<&str> {
    let start = text.find(PEM_BEGIN)?;
    let end = text[start..].find(PEM_END)? + start + PEM_END.len();
    Some(&text[start..end])
}
