use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Invalid page index: {0}")]
    InvalidPageIndex(String),

    #[error("Page {requested} out of range: document has {page_count} pages (accepted values 0..={max_accepted})")]
    PageOutOfRange {
        requested: i64,
        page_count: u32,
        max_accepted: u64,
    },

    #[error("Invalid coordinate for {axis}: '{value}'")]
    InvalidCoordinate { axis: &'static str, value: String },
}
