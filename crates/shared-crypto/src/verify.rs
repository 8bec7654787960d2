//! Per-field signature validation
//!
//! Checks that the CMS `messageDigest` signed attribute matches the digest
//! of the bytes covered by `/ByteRange`. This proves the covered bytes are
//! the ones that were signed. Certificate trust is not evaluated.

use cms::content_info::ContentInfo;
use cms::signed_data::{SignedData, SignerIdentifier, SignerInfo};
use sha2::{Digest, Sha256, Sha384, Sha512};
use shared_pdf::SignatureFieldRecord;
use x509_cert::der::asn1::ObjectIdentifier;
use x509_cert::der::{Decode, Encode, SliceReader, Tag, Tagged};
use x509_cert::Certificate;

use crate::error::VerifyError;
use crate::subject::SubjectSummary;

/// id-messageDigest: 1.2.840.113549.1.9.4
pub const OID_MESSAGE_DIGEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.4");
/// id-sha256: 2.16.840.1.101.3.4.2.1
pub const OID_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
/// id-sha384: 2.16.840.1.101.3.4.2.2
pub const OID_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");
/// id-sha512: 2.16.840.1.101.3.4.2.3
pub const OID_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

/// Result of checking one signature field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerificationOutcome {
    pub valid: bool,
    /// Subject of the signing certificate, when embedded
    pub signer: Option<SubjectSummary>,
}

/// Validation routine applied to each enumerated signature field
pub trait SignatureVerifier {
    fn verify(
        &self,
        document: &[u8],
        field: &SignatureFieldRecord,
    ) -> Result<VerificationOutcome, VerifyError>;
}

/// Digest comparison over the CMS detached signature
#[derive(Debug, Default, Clone, Copy)]
pub struct CmsDigestVerifier;

impl SignatureVerifier for CmsDigestVerifier {
    fn verify(
        &self,
        document: &[u8],
        field: &SignatureFieldRecord,
    ) -> Result<VerificationOutcome, VerifyError> {
        let contents = field.contents.as_deref().ok_or(VerifyError::MissingContents)?;
        let byte_range = field
            .byte_range
            .as_deref()
            .ok_or(VerifyError::MissingByteRange)?;

        let signed_bytes = extract_signed_bytes(document, byte_range)?;
        let signed_data = decode_signed_data(contents)?;
        let signer_info = signed_data
            .signer_infos
            .0
            .iter()
            .next()
            .ok_or(VerifyError::NoSignerInfo)?;

        let expected = message_digest(signer_info)?;
        let actual = compute_digest(&signer_info.digest_alg.oid, &signed_bytes)?;
        let valid = expected == actual;

        tracing::debug!(
            field = field.name.as_deref().unwrap_or(""),
            expected = %hex::encode(&expected),
            actual = %hex::encode(&actual),
            valid,
            "Compared signature digest"
        );

        let signer = signer_certificate(&signed_data, signer_info).map(SubjectSummary::from_certificate);

        Ok(VerificationOutcome { valid, signer })
    }
}

/// Concatenate the two signed byte spans named by `[o1, l1, o2, l2]`
pub fn extract_signed_bytes(document: &[u8], byte_range: &[i64]) -> Result<Vec<u8>, VerifyError> {
    let [o1, l1, o2, l2] = byte_range else {
        return Err(VerifyError::MalformedByteRange(format!(
            "expected 4 values, found {}",
            byte_range.len()
        )));
    };

    let mut signed = Vec::new();
    for (offset, length) in [(*o1, *l1), (*o2, *l2)] {
        let (start, len) = match (u64::try_from(offset), u64::try_from(length)) {
            (Ok(start), Ok(len)) => (start, len),
            _ => {
                return Err(VerifyError::MalformedByteRange(format!(
                    "negative value in [{}, {}]",
                    offset, length
                )))
            }
        };
        let end = start
            .checked_add(len)
            .ok_or_else(|| VerifyError::MalformedByteRange("range overflows".to_string()))?;
        if end > document.len() as u64 {
            return Err(VerifyError::ByteRangeOutOfBounds {
                end,
                len: document.len(),
            });
        }
        signed.extend_from_slice(&document[start as usize..end as usize]);
    }
    Ok(signed)
}

/// Decode `ContentInfo` and its `SignedData`, ignoring trailing padding
fn decode_signed_data(contents: &[u8]) -> Result<SignedData, VerifyError> {
    let mut reader = SliceReader::new(contents)?;
    let content_info = ContentInfo::decode(&mut reader)?;
    let inner = content_info.content.to_der()?;
    Ok(SignedData::from_der(&inner)?)
}

fn message_digest(signer_info: &SignerInfo) -> Result<Vec<u8>, VerifyError> {
    let attrs = signer_info
        .signed_attrs
        .as_ref()
        .ok_or(VerifyError::NoMessageDigest)?;

    attrs
        .iter()
        .filter(|attr| attr.oid == OID_MESSAGE_DIGEST)
        .flat_map(|attr| attr.values.iter())
        .find(|value| value.tag() == Tag::OctetString)
        .map(|value| value.value().to_vec())
        .ok_or(VerifyError::NoMessageDigest)
}

/// Hash `data` with the algorithm named by `oid`
pub fn compute_digest(oid: &ObjectIdentifier, data: &[u8]) -> Result<Vec<u8>, VerifyError> {
    if *oid == OID_SHA256 {
        Ok(Sha256::digest(data).to_vec())
    } else if *oid == OID_SHA384 {
        Ok(Sha384::digest(data).to_vec())
    } else if *oid == OID_SHA512 {
        Ok(Sha512::digest(data).to_vec())
    } else {
        Err(VerifyError::UnsupportedDigest(oid.to_string()))
    }
}

/// Certificate matching the signer's serial number, else the first one
fn signer_certificate<'a>(
    signed_data: &'a SignedData,
    signer_info: &SignerInfo,
) -> Option<&'a Certificate> {
    let certs: Vec<&Certificate> = signed_data
        .certificates
        .as_ref()?
        .0
        .iter()
        .filter_map(|choice| match choice {
            cms::cert::CertificateChoices::Certificate(cert) => Some(cert),
            _ => None,
        })
        .collect();

    let by_serial = match &signer_info.sid {
        SignerIdentifier::IssuerAndSerialNumber(id) => certs
            .iter()
            .find(|cert| cert.tbs_certificate.serial_number == id.serial_number)
            .copied(),
        SignerIdentifier::SubjectKeyIdentifier(_) => None,
    };
    by_serial.or_else(|| certs.first().copied())
}


#[cfg(test)]
mod tests {
    use super::test_support::cms_with_digest;
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &[u8] = b"%PDF-1.7 header <SIGNATURE> trailer";

    fn field(contents: Vec<u8>, byte_range: Vec<i64>) -> SignatureFieldRecord {
        SignatureFieldRecord {
            name: Some("Sig1".to_string()),
            contents: Some(contents),
            byte_range: Some(byte_range),
            ..Default::default()
        }
    }

    fn covered() -> Vec<u8> {
        extract_signed_bytes(DOCUMENT, &[0, 16, 27, 8]).unwrap()
    }

    #[test]
    fn test_extract_signed_bytes_skips_gap() {
        assert_eq!(covered(), b"%PDF-1.7 header  trailer".to_vec());
    }

    #[test]
    fn test_extract_rejects_out_of_bounds() {
        let err = extract_signed_bytes(DOCUMENT, &[0, 16, 27, 100]).unwrap_err();
        assert_eq!(
            err,
            VerifyError::ByteRangeOutOfBounds {
                end: 127,
                len: DOCUMENT.len()
            }
        );
    }

    #[test]
    fn test_extract_rejects_negative_and_short_ranges() {
        assert!(matches!(
            extract_signed_bytes(DOCUMENT, &[0, -1, 2, 3]),
            Err(VerifyError::MalformedByteRange(_))
        ));
        assert!(matches!(
            extract_signed_bytes(DOCUMENT, &[0, 1]),
            Err(VerifyError::MalformedByteRange(_))
        ));
    }

    #[test]
    fn test_matching_sha256_digest_is_valid() {
        let mut contents = cms_with_digest(OID_SHA256, &Sha256::digest(covered()));
        // /Contents is zero padded up to its reserved size
        contents.extend_from_slice(&[0u8; 64]);

        let outcome = CmsDigestVerifier
            .verify(DOCUMENT, &field(contents, vec![0, 16, 27, 8]))
            .unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.signer, None);
    }

    #[test]
    fn test_matching_sha512_digest_is_valid() {
        let contents = cms_with_digest(OID_SHA512, &Sha512::digest(covered()));
        let outcome = CmsDigestVerifier
            .verify(DOCUMENT, &field(contents, vec![0, 16, 27, 8]))
            .unwrap();
        assert!(outcome.valid);
    }

    #[test]
    fn test_tampered_bytes_are_invalid() {
        let contents = cms_with_digest(OID_SHA256, &Sha256::digest(covered()));
        let tampered = b"%PDF-1.7 HEADER <SIGNATURE> trailer";
        let outcome = CmsDigestVerifier
            .verify(tampered, &field(contents, vec![0, 16, 27, 8]))
            .unwrap();
        assert!(!outcome.valid);
    }

    #[test]
    fn test_sha1_is_unsupported() {
        let sha1 = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
        let contents = cms_with_digest(sha1, &[0u8; 20]);
        let err = CmsDigestVerifier
            .verify(DOCUMENT, &field(contents, vec![0, 16, 27, 8]))
            .unwrap_err();
        assert!(matches!(err, VerifyError::UnsupportedDigest(_)));
    }

    #[test]
    fn test_garbage_contents_fail_to_decode() {
        let err = CmsDigestVerifier
            .verify(DOCUMENT, &field(vec![0x30, 0x03, 0x02, 0x01, 0x00], vec![0, 16, 27, 8]))
            .unwrap_err();
        assert!(matches!(err, VerifyError::Cms(_)));
    }

    #[test]
    fn test_missing_values_are_reported() {
        let no_contents = SignatureFieldRecord {
            byte_range: Some(vec![0, 1, 2, 3]),
            ..Default::default()
        };
        assert_eq!(
            CmsDigestVerifier.verify(DOCUMENT, &no_contents).unwrap_err(),
            VerifyError::MissingContents
        );

        let no_range = SignatureFieldRecord {
            contents: Some(vec![1]),
            ..Default::default()
        };
        assert_eq!(
            CmsDigestVerifier.verify(DOCUMENT, &no_range).unwrap_err(),
            VerifyError::MissingByteRange
        );
    }
}
