//! Validation strategies
//!
//! Each strategy either produces a complete report or fails. The classifier
//! tries them in order and keeps the first report.

use shared_crypto::{SignatureVerifier, VerificationOutcome};
use shared_pdf::{enumerate_signature_fields, SignatureFieldRecord};

use crate::classify::{classify, SystemType};
use crate::date::pdf_date_to_iso;
use crate::error::StrategyError;
use crate::messages::{report_message, MessageInputs};
use crate::report::{
    CertificateInfo, QrInfo, ReportDetails, SignatureInfo, ValidationMode, ValidationReport,
    UNKNOWN, VALIDITY_ERROR, VALIDITY_INVALID, VALIDITY_VALID,
};
use crate::vocabulary::MarkerVocabulary;

pub trait ValidationStrategy {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        document: &[u8],
        vocabulary: &MarkerVocabulary,
    ) -> Result<ValidationReport, StrategyError>;
}

/// Degraded mode: substring markers over the raw bytes
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerHeuristicStrategy;

impl ValidationStrategy for MarkerHeuristicStrategy {
    fn name(&self) -> &'static str {
        "marker_heuristic"
    }

    fn evaluate(
        &self,
        document: &[u8],
        vocabulary: &MarkerVocabulary,
    ) -> Result<ValidationReport, StrategyError> {
        let scan = vocabulary.scan(document);
        let system_type = classify(&scan);
        let indicators = scan.generic_count();
        let has_signatures = indicators > 0;

        tracing::debug!(
            own = ?scan.own,
            foreign = ?scan.foreign,
            generic = ?scan.generic,
            ?system_type,
            "Marker scan"
        );

        let message = report_message(&MessageInputs {
            mode: ValidationMode::MarkerHeuristic,
            has_signatures,
            system_type,
            is_modified: false,
            signature_count: indicators,
            valid: indicators,
            total: indicators,
        });

        Ok(ValidationReport {
            is_valid: has_signatures,
            message,
            details: ReportDetails {
                has_signatures,
                signature_count: indicators,
                valid_signatures: None,
                is_modified: false,
                is_our_system: system_type == SystemType::OwnSystem,
                system_type,
                certificate_info: CertificateInfo {
                    is_valid: has_signatures,
                    message: format!("{} indicadores de firma encontrados", indicators),
                },
                signatures: Vec::new(),
            },
            qr_info: qr_info(has_signatures, system_type, &[]),
            success: None,
            error: None,
            mode: ValidationMode::MarkerHeuristic,
        })
    }
}

/// Authoritative mode: enumerate signature fields through the document
/// model and check each one with a verifier
#[derive(Debug, Default, Clone)]
pub struct FieldEnumerationStrategy<V> {
    verifier: V,
}

impl<V: SignatureVerifier> FieldEnumerationStrategy<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    fn check_field(&self, document: &[u8], field: &SignatureFieldRecord) -> (SignatureInfo, bool) {
        let outcome = self.verifier.verify(document, field);
        let (validity, signer) = match outcome {
            Ok(VerificationOutcome { valid, signer }) => {
                let validity = if valid { VALIDITY_VALID } else { VALIDITY_INVALID };
                (validity, signer)
            }
            Err(e) => {
                tracing::warn!(
                    field = field.name.as_deref().unwrap_or(UNKNOWN),
                    error = %e,
                    "Signature check failed"
                );
                (VALIDITY_ERROR, None)
            }
        };
        tracing::debug!(
            field = field.name.as_deref().unwrap_or(UNKNOWN),
            sub_filter = field.sub_filter.as_deref().unwrap_or(UNKNOWN),
            validity,
            "Checked signature field"
        );

        let mut info = SignatureInfo {
            validity: validity.to_string(),
            ..Default::default()
        };
        if let Some(name) = &field.name {
            info.field_name = name.clone();
        }
        if let Some(page) = field.page {
            info.page = page;
        }
        if let Some(rect) = field.rect {
            info.x = rect.x;
            info.y = rect.y;
            info.width = rect.width;
            info.height = rect.height;
        }
        let common_name = signer.as_ref().and_then(|s| s.common_name.clone());
        if let Some(name) = common_name.or_else(|| field.signer_name.clone()) {
            info.signer = name;
        }
        info.organization = signer.and_then(|s| s.organization);
        if let Some(iso) = field.signing_time.as_deref().and_then(pdf_date_to_iso) {
            info.timestamp = iso;
        }

        (info, validity == VALIDITY_VALID)
    }
}

impl<V: SignatureVerifier> ValidationStrategy for FieldEnumerationStrategy<V> {
    fn name(&self) -> &'static str {
        "field_enumeration"
    }

    fn evaluate(
        &self,
        document: &[u8],
        vocabulary: &MarkerVocabulary,
    ) -> Result<ValidationReport, StrategyError> {
        let doc = shared_pdf::load_document(document)?;
        let fields = enumerate_signature_fields(&doc);

        let mut signatures = Vec::with_capacity(fields.len());
        let mut valid = 0;
        for field in &fields {
            let (info, ok) = self.check_field(document, field);
            if ok {
                valid += 1;
            }
            signatures.push(info);
        }
        let total = fields.len();
        let has_signatures = total > 0;

        // Signer metadata counts as evidence next to the raw bytes
        let mut scan = vocabulary.scan(document);
        for info in &signatures {
            for text in [Some(&info.signer), info.organization.as_ref()].into_iter().flatten() {
                scan.merge(vocabulary.scan(text.as_bytes()));
            }
        }
        let system_type = classify(&scan);
        let is_modified = has_signatures && is_modified(document, &fields);

        tracing::debug!(
            total,
            valid,
            is_modified,
            own = ?scan.own,
            foreign = ?scan.foreign,
            ?system_type,
            "Field enumeration"
        );

        let message = report_message(&MessageInputs {
            mode: ValidationMode::FieldEnumeration,
            has_signatures,
            system_type,
            is_modified,
            signature_count: total,
            valid,
            total,
        });

        let certificate_info = if has_signatures {
            CertificateInfo {
                is_valid: valid > 0,
                message: format!("{}/{} firmas válidas", valid, total),
            }
        } else {
            CertificateInfo {
                is_valid: false,
                message: "No hay certificados para validar".to_string(),
            }
        };

        Ok(ValidationReport {
            is_valid: has_signatures && valid > 0,
            message,
            qr_info: qr_info(has_signatures, system_type, &signatures),
            details: ReportDetails {
                has_signatures,
                signature_count: total,
                valid_signatures: Some(valid),
                is_modified,
                is_our_system: system_type == SystemType::OwnSystem,
                system_type,
                certificate_info,
                signatures,
            },
            success: None,
            error: None,
            mode: ValidationMode::FieldEnumeration,
        })
    }
}

fn qr_info(
    has_signatures: bool,
    system_type: SystemType,
    signatures: &[SignatureInfo],
) -> Option<QrInfo> {
    (has_signatures && system_type == SystemType::OwnSystem)
        .then(|| QrInfo::from_signatures(signatures))
}

/// True when bytes past the furthest signed range carry content.
///
/// Trailing whitespace and zero padding are ignored.
pub fn is_modified(document: &[u8], fields: &[SignatureFieldRecord]) -> bool {
    let signed_end = fields
        .iter()
        .filter_map(|f| match f.byte_range.as_deref() {
            Some([_, _, offset, length]) => offset.checked_add(*length),
            _ => None,
        })
        .max();
    let Some(signed_end) = signed_end else {
        return false;
    };

    let content_end = document
        .iter()
        .rposition(|b| !b.is_ascii_whitespace() && *b != 0)
        .map_or(0, |i| i + 1);
    signed_end < content_end as i64
}
