//! Validation report and its JSON shape

use serde::Serialize;

use crate::classify::SystemType;

/// Placeholder for any value that could not be extracted
pub const UNKNOWN: &str = "Desconocido";

pub const VALIDITY_VALID: &str = "Válida";
pub const VALIDITY_INVALID: &str = "Inválida";
pub const VALIDITY_ERROR: &str = "Error en validación";

const QR_DEFAULT_SIGNER: &str = "Firmante del Sistema";
const QR_DEFAULT_ORGANIZATION: &str = "Digital Sign System";
const QR_DEFAULT_TIMESTAMP: &str = "2024-01-01T00:00:00Z";

/// How a report was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Byte markers only, no document model
    MarkerHeuristic,
    /// Enumerated signature fields, each checked by a verifier
    FieldEnumeration,
    /// Nothing could be evaluated, see `error`
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub message: String,
    pub details: ReportDetails,
    pub qr_info: Option<QrInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub mode: ValidationMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetails {
    pub has_signatures: bool,
    pub signature_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_signatures: Option<usize>,
    pub is_modified: bool,
    pub is_our_system: bool,
    pub system_type: SystemType,
    pub certificate_info: CertificateInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SignatureInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub is_valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrInfo {
    pub signer_name: String,
    pub organization: String,
    pub timestamp: String,
}

/// One signature field, always fully populated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub field_name: String,
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub signer: String,
    pub timestamp: String,
    pub validity: String,
    /// Signer organization, feeds the QR summary only
    #[serde(skip)]
    pub organization: Option<String>,
}

impl Default for SignatureInfo {
    fn default() -> Self {
        Self {
            field_name: UNKNOWN.to_string(),
            page: 1,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
            signer: UNKNOWN.to_string(),
            timestamp: UNKNOWN.to_string(),
            validity: UNKNOWN.to_string(),
            organization: None,
        }
    }
}

impl QrInfo {
    /// Summary of the first signature that carries each value
    pub fn from_signatures(signatures: &[SignatureInfo]) -> Self {
        let known = |value: &String| value != UNKNOWN;
        Self {
            signer_name: signatures
                .iter()
                .map(|s| &s.signer)
                .find(|v| known(v))
                .cloned()
                .unwrap_or_else(|| QR_DEFAULT_SIGNER.to_string()),
            organization: signatures
                .iter()
                .find_map(|s| s.organization.clone())
                .unwrap_or_else(|| QR_DEFAULT_ORGANIZATION.to_string()),
            timestamp: signatures
                .iter()
                .map(|s| &s.timestamp)
                .find(|v| known(v))
                .cloned()
                .unwrap_or_else(|| QR_DEFAULT_TIMESTAMP.to_string()),
        }
    }
}

impl ValidationReport {
    /// Well-formed report for a validation that could not run
    pub fn failure(error: impl ToString) -> Self {
        let error = error.to_string();
        Self {
            is_valid: false,
            message: format!("Error al validar el PDF: {}", error),
            details: ReportDetails {
                has_signatures: false,
                signature_count: 0,
                valid_signatures: None,
                is_modified: false,
                is_our_system: false,
                system_type: SystemType::UnknownSystem,
                certificate_info: CertificateInfo {
                    is_valid: false,
                    message: format!("Error: {}", error),
                },
                signatures: Vec::new(),
            },
            qr_info: None,
            success: Some(false),
            error: Some(error),
            mode: ValidationMode::Failed,
        }
    }

    pub fn has_signatures(&self) -> bool {
        self.details.has_signatures
    }

    pub fn signature_count(&self) -> usize {
        self.details.signature_count
    }

    pub fn system_type(&self) -> SystemType {
        self.details.system_type
    }

    pub fn signatures(&self) -> &[SignatureInfo] {
        &self.details.signatures
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
