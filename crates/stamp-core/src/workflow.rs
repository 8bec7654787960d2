//! One signing request, start to finish
//!
//! All checks run before the backend writes anything, so a failed request
//! never leaves a partial output file.

use std::fmt;
use std::path::{Path, PathBuf};

use placement_core::{
    normalize, CoordinateConvention, PageGeometry, PageInterpretation, SignatureRequest, StampRect,
};
use serde::Serialize;
use shared_pdf::{signature_field_name_for_path, PageInspector};

use crate::backend::{SigningBackend, StampRequest};
use crate::error::SignError;

/// Raw signing arguments, as received on the command line
#[derive(Clone)]
pub struct SignJob {
    pub certificate: PathBuf,
    pub password: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub page: String,
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
    pub ca_certificate: Option<PathBuf>,
}

impl fmt::Debug for SignJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignJob")
            .field("certificate", &self.certificate)
            .field("password", &"<redacted>")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("page", &self.page)
            .field("corners", &[&self.x1, &self.y1, &self.x2, &self.y2])
            .field("ca_certificate", &self.ca_certificate)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignConfig {
    /// Abort when page geometry cannot be read instead of signing unchecked
    pub require_page_geometry: bool,
}

/// Summary of a completed signature
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutcome {
    pub output: PathBuf,
    pub field_name: String,
    pub page_index: u32,
    pub rect: StampRect,
    pub page_interpretation: PageInterpretation,
    pub convention: CoordinateConvention,
}

pub fn sign_document<B, I>(
    job: &SignJob,
    config: &SignConfig,
    backend: &B,
    inspector: &I,
) -> Result<SignOutcome, SignError>
where
    B: SigningBackend + ?Sized,
    I: PageInspector + ?Sized,
{
    check_certificate(&job.certificate)?;
    require_file("Input PDF", &job.input)?;
    if let Some(ca) = &job.ca_certificate {
        require_file("CA certificate", ca)?;
    }

    let request = SignatureRequest::parse(&job.page, &job.x1, &job.y1, &job.x2, &job.y2)?;
    tracing::debug!(?request, "Parsed signature request");

    let credentials = backend.load_credentials(&job.certificate, &job.password)?;

    let geometry = match inspector.inspect(&job.input) {
        Ok(geometry) => geometry,
        Err(e) if config.require_page_geometry => {
            return Err(SignError::DocumentOpenFailure(e.to_string()));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cannot read page geometry, signing without page checks");
            PageGeometry::unknown()
        }
    };

    let placement = normalize(&request, &geometry)?;
    let field_name = signature_field_name_for_path(&job.input);
    if field_name != "Sig1" {
        tracing::info!(field_name = %field_name, "Document already signed, adding signature");
    }

    let qr_payload = credentials.subject.qr_payload();
    backend.stamp(&StampRequest {
        input: &job.input,
        output: &job.output,
        certificate: &job.certificate,
        password: &job.password,
        ca_certificate: job.ca_certificate.as_deref(),
        field_name: &field_name,
        placement: &placement,
        qr_payload: &qr_payload,
    })?;

    Ok(SignOutcome {
        output: job.output.clone(),
        field_name,
        page_index: placement.page_index,
        rect: placement.rect,
        page_interpretation: placement.page_interpretation,
        convention: placement.convention,
    })
}

fn check_certificate(path: &Path) -> Result<(), SignError> {
    let metadata = std::fs::metadata(path).map_err(|_| SignError::FileNotFound {
        what: "Certificate",
        path: path.to_path_buf(),
    })?;
    if metadata.len() == 0 {
        return Err(SignError::EmptyCertificateFile(path.to_path_buf()));
    }
    Ok(())
}

fn require_file(what: &'static str, path: &Path) -> Result<(), SignError> {
    if path.exists() {
        Ok(())
    } else {
        Err(SignError::FileNotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}
