//! Signature evidence classification
//!
//! Looks at a PDF and reports whether it carries digital signatures, which
//! system produced them and whether they still match the document.
//!
//! Two modes share one report shape:
//! - field enumeration through the document model, each field checked by a
//!   [`shared_crypto::SignatureVerifier`]
//! - a byte-marker heuristic used when the document model cannot read the
//!   file
//!
//! ```no_run
//! use evidence_core::{EvidenceClassifier, MarkerVocabulary};
//!
//! let classifier = EvidenceClassifier::new(MarkerVocabulary::default());
//! let report = classifier.validate_path(std::path::Path::new("signed.pdf"));
//! println!("{}", report.message);
//! ```

pub mod classify;
pub mod date;
pub mod error;
pub mod messages;
pub mod report;
pub mod strategy;
pub mod validator;
pub mod vocabulary;

pub use classify::{classify, SystemType};
pub use error::StrategyError;
pub use report::{
    CertificateInfo, QrInfo, ReportDetails, SignatureInfo, ValidationMode, ValidationReport,
};
pub use strategy::{FieldEnumerationStrategy, MarkerHeuristicStrategy, ValidationStrategy};
pub use validator::EvidenceClassifier;
pub use vocabulary::{EvidenceMarker, MarkerCategory, MarkerScan, MarkerVocabulary};
