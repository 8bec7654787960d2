//! Stamp rectangle resolution
//!
//! PDF user space has its origin at the bottom-left corner and counts in
//! points. Requests may arrive as page fractions or as top-left pixel
//! coordinates from a web canvas, so Y is flipped when the numbers look
//! like they came from a top-left system.

use serde::Serialize;

use crate::error::PlacementError;
use crate::request::Point;
use crate::PageGeometry;

/// Top-left Y values up to this multiple of the page height are flipped
const TOP_LEFT_HEIGHT_TOLERANCE: f64 = 1.2;

/// Box in PDF points, lower-left origin. `llx <= urx` and `lly <= ury`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StampRect {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl StampRect {
    /// Build from two opposite corners in any order
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            llx: x1.min(x2),
            lly: y1.min(y2),
            urx: x1.max(x2),
            ury: y1.max(y2),
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

/// Coordinate convention inferred for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateConvention {
    /// Fractions of the page, top-left origin
    PageFractions,
    /// Points or pixels with a top-left origin, Y flipped
    TopLeftPoints,
    /// Already PDF user space
    BottomLeftPoints,
}

/// Resolve two corners into a PDF-native stamp rectangle
pub fn resolve_rect(
    corner1: Point,
    corner2: Point,
    geometry: &PageGeometry,
) -> Result<(StampRect, CoordinateConvention), PlacementError> {
    for (axis, value) in [
        ("x1", corner1.x),
        ("y1", corner1.y),
        ("x2", corner2.x),
        ("y2", corner2.y),
    ] {
        if !value.is_finite() {
            return Err(PlacementError::InvalidCoordinate {
                axis,
                value: value.to_string(),
            });
        }
    }

    let all_fractions = [corner1.x, corner1.y, corner2.x, corner2.y]
        .iter()
        .all(|v| (0.0..=1.0).contains(v));

    if all_fractions {
        if let Some((width, height)) = geometry.dimensions() {
            let rect = StampRect::from_corners(
                corner1.x * width,
                height - corner1.y * height,
                corner2.x * width,
                height - corner2.y * height,
            );
            return Ok((rect, CoordinateConvention::PageFractions));
        }
    }

    match geometry.page_height_pt {
        Some(height) if corner1.y.max(corner2.y) <= height * TOP_LEFT_HEIGHT_TOLERANCE => {
            let rect = StampRect::from_corners(
                corner1.x,
                height - corner1.y,
                corner2.x,
                height - corner2.y,
            );
            Ok((rect, CoordinateConvention::TopLeftPoints))
        }
        _ => {
            let rect = StampRect::from_corners(corner1.x, corner1.y, corner2.x, corner2.y);
            Ok((rect, CoordinateConvention::BottomLeftPoints))
        }
    }
}
