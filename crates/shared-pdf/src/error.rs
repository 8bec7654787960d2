use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfInspectError {
    #[error("Failed to open PDF: {0}")]
    Open(String),
}

impl From<lopdf::Error> for PdfInspectError {
    fn from(err: lopdf::Error) -> Self {
        PdfInspectError::Open(err.to_string())
    }
}
