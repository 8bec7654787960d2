use shared_pdf::PdfInspectError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Cannot read PDF structure: {0}")]
    Document(#[from] PdfInspectError),

    #[error("No validation strategy configured")]
    NoStrategies,
}
