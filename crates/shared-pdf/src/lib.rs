//! PDF document model helpers
//!
//! Thin layer over `lopdf` for the two things the signing and validation
//! tools need from a document: page geometry and the signature fields of
//! the interactive form.

pub mod error;
pub mod fields;
pub mod geometry;
mod object;

pub use error::PdfInspectError;
pub use fields::{
    enumerate_signature_fields, next_signature_field_name, signature_field_name_for_path,
    FieldRect, SignatureFieldRecord,
};
pub use geometry::{geometry_of, LopdfInspector, PageInspector};

use lopdf::Document;
use std::path::Path;

/// Parse a document from memory
pub fn load_document(bytes: &[u8]) -> Result<Document, PdfInspectError> {
    Ok(Document::load_mem(bytes)?)
}

/// Parse a document from disk
pub fn open_document(path: &Path) -> Result<Document, PdfInspectError> {
    Document::load(path).map_err(|e| PdfInspectError::Open(format!("{}: {}", path.display(), e)))
}
