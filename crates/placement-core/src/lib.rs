//! Signature stamp placement
//!
//! Turns an ambiguous placement request (page index of unknown base,
//! corners in fractions, canvas pixels or PDF points) into one PDF-native
//! placement: zero-based page index plus a lower-left/upper-right box in
//! points.
//!
//! The conventions are guessed from numeric ranges, there is no units
//! field. The decision table is kept stable because callers depend on it.

pub mod error;
pub mod page;
pub mod rect;
pub mod request;

pub use error::PlacementError;
pub use page::{resolve_page_index, PageInterpretation};
pub use rect::{resolve_rect, CoordinateConvention, StampRect};
pub use request::{Point, SignatureRequest};

use serde::Serialize;

/// Page geometry reported by the document inspector.
///
/// Width and height belong to the reference (first) page and are absent
/// when the document model could not provide a usable MediaBox.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_count: Option<u32>,
    pub page_width_pt: Option<f64>,
    pub page_height_pt: Option<f64>,
}

impl PageGeometry {
    /// Geometry for a document that could not be inspected at all
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn new(page_count: u32, page_width_pt: f64, page_height_pt: f64) -> Self {
        Self {
            page_count: Some(page_count),
            page_width_pt: Some(page_width_pt),
            page_height_pt: Some(page_height_pt),
        }
    }

    /// Page count is known but page dimensions are not
    pub fn count_only(page_count: u32) -> Self {
        Self {
            page_count: Some(page_count),
            ..Self::default()
        }
    }

    /// Both dimensions, only when both are known
    pub fn dimensions(&self) -> Option<(f64, f64)> {
        match (self.page_width_pt, self.page_height_pt) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }
}

/// Unambiguous placement handed to the stamping backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPlacement {
    /// Zero-based page index
    pub page_index: u32,
    pub rect: StampRect,
    pub page_interpretation: PageInterpretation,
    pub convention: CoordinateConvention,
}

/// Resolve page index and stamp rectangle for one signing request.
///
/// Pure function of its inputs. Any error is fatal to the signing attempt.
pub fn normalize(
    request: &SignatureRequest,
    geometry: &PageGeometry,
) -> Result<NormalizedPlacement, PlacementError> {
    let (page_index, page_interpretation) = resolve_page_index(request.page, geometry.page_count)?;
    let (rect, convention) = resolve_rect(request.corner1, request.corner2, geometry)?;

    tracing::debug!(
        requested_page = request.page,
        page_index,
        ?page_interpretation,
        ?convention,
        llx = rect.llx,
        lly = rect.lly,
        urx = rect.urx,
        ury = rect.ury,
        "Normalized signature placement"
    );

    Ok(NormalizedPlacement {
        page_index,
        rect,
        page_interpretation,
        convention,
    })
}
