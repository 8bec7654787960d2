use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerifyError {
    #[error("Signature has no /Contents")]
    MissingContents,

    #[error("Signature has no /ByteRange")]
    MissingByteRange,

    #[error("Malformed /ByteRange: {0}")]
    MalformedByteRange(String),

    #[error("/ByteRange ends at {end} but the document has {len} bytes")]
    ByteRangeOutOfBounds { end: u64, len: usize },

    #[error("Cannot decode CMS structure: {0}")]
    Cms(String),

    #[error("CMS structure has no signer info")]
    NoSignerInfo,

    #[error("Signer info has no message digest attribute")]
    NoMessageDigest,

    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedDigest(String),

    #[error("Cannot parse certificate: {0}")]
    Certificate(String),
}

impl From<x509_cert::der::Error> for VerifyError {
    fn from(err: x509_cert::der::Error) -> Self {
        VerifyError::Cms(err.to_string())
    }
}
