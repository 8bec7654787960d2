//! Signature cryptography helpers
//!
//! CMS digest checks for signed PDF fields and X.509 subject summaries
//! for stamps and reports.

pub mod error;
pub mod subject;
pub mod verify;

pub use error::VerifyError;
pub use subject::SubjectSummary;
pub use verify::{
    compute_digest, extract_signed_bytes, CmsDigestVerifier, SignatureVerifier,
    VerificationOutcome,
};
