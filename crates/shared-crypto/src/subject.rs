//! Certificate subject summaries

use x509_cert::der::asn1::ObjectIdentifier;
use x509_cert::der::{DecodePem, Tag, Tagged};
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::error::VerifyError;

/// id-at-commonName: 2.5.4.3
pub const OID_COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// id-at-organizationName: 2.5.4.10
pub const OID_ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// pkcs-9 emailAddress: 1.2.840.113549.1.9.1
pub const OID_EMAIL_ADDRESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

/// Placeholder for subject parts a certificate does not carry
const UNKNOWN: &str = "Unknown";

/// The subject attributes shown to people
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSummary {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
}

impl SubjectSummary {
    pub fn from_certificate(cert: &Certificate) -> Self {
        Self::from_name(&cert.tbs_certificate.subject)
    }

    /// First certificate of a PEM bundle
    pub fn from_pem(pem: &str) -> Result<Self, VerifyError> {
        let cert = Certificate::from_pem(pem.as_bytes())
            .map_err(|e| VerifyError::Certificate(e.to_string()))?;
        Ok(Self::from_certificate(&cert))
    }

    pub fn from_name(name: &Name) -> Self {
        let mut summary = Self::default();
        for rdn in name.0.iter() {
            for atv in rdn.0.iter() {
                let slot = if atv.oid == OID_COMMON_NAME {
                    &mut summary.common_name
                } else if atv.oid == OID_ORGANIZATION {
                    &mut summary.organization
                } else if atv.oid == OID_EMAIL_ADDRESS {
                    &mut summary.email
                } else {
                    continue;
                };
                if slot.is_none() {
                    *slot = directory_string(atv.value.tag(), atv.value.value());
                }
            }
        }
        summary
    }

    /// Text encoded in the visible QR stamp
    pub fn qr_payload(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nOrganization: {}",
            self.common_name.as_deref().unwrap_or(UNKNOWN),
            self.email.as_deref().unwrap_or(UNKNOWN),
            self.organization.as_deref().unwrap_or(UNKNOWN),
        )
    }
}

fn directory_string(tag: Tag, bytes: &[u8]) -> Option<String> {
    let text = match tag {
        Tag::BmpString => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use x509_cert::attr::AttributeTypeAndValue;
    use x509_cert::der::asn1::SetOfVec;
    use x509_cert::der::Any;
    use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

    #[test]
    fn test_summary_from_distinguished_name() {
        let name = RdnSequence::from_str("CN=Ana Perez,O=Digital Sign,C=ES").unwrap();
        let summary = SubjectSummary::from_name(&name);
        assert_eq!(summary.common_name.as_deref(), Some("Ana Perez"));
        assert_eq!(summary.organization.as_deref(), Some("Digital Sign"));
        assert_eq!(summary.email, None);
    }

    #[test]
    fn test_summary_reads_email_attribute() {
        let atv = AttributeTypeAndValue {
            oid: OID_EMAIL_ADDRESS,
            value: Any::new(Tag::Ia5String, b"ana@example.es".to_vec()).unwrap(),
        };
        let rdn = RelativeDistinguishedName(SetOfVec::try_from(vec![atv]).unwrap());
        let summary = SubjectSummary::from_name(&RdnSequence(vec![rdn]));
        assert_eq!(summary.email.as_deref(), Some("ana@example.es"));
    }

    #[test]
    fn test_bmp_string_is_decoded() {
        let bytes = [0x00, 0x4A, 0x00, 0x6F, 0x00, 0x73, 0x00, 0xE9];
        assert_eq!(
            directory_string(Tag::BmpString, &bytes).as_deref(),
            Some("José")
        );
    }

    #[test]
    fn test_qr_payload_with_defaults() {
        let summary = SubjectSummary {
            common_name: Some("Ana Perez".to_string()),
            organization: None,
            email: None,
        };
        assert_eq!(
            summary.qr_payload(),
            "Name: Ana Perez\nEmail: Unknown\nOrganization: Unknown"
        );
    }

    #[test]
    fn test_from_pem_rejects_garbage() {
        let err = SubjectSummary::from_pem("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n")
            .unwrap_err();
        assert!(matches!(err, VerifyError::Certificate(_)));
    }
}
