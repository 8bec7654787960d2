use serde::Serialize;

use crate::error::PlacementError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Raw placement request as supplied by a caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignatureRequest {
    /// Page number, base unknown until resolved against the page count
    pub page: i64,
    pub corner1: Point,
    pub corner2: Point,
}

impl SignatureRequest {
    pub fn new(page: i64, corner1: Point, corner2: Point) -> Self {
        Self {
            page,
            corner1,
            corner2,
        }
    }

    /// Parse command-line text into a request.
    ///
    /// The page accepts any finite decimal and is truncated toward zero,
    /// so "2.0" and "2.7" both mean page 2.
    pub fn parse(
        page: &str,
        x1: &str,
        y1: &str,
        x2: &str,
        y2: &str,
    ) -> Result<Self, PlacementError> {
        let page = parse_page(page)?;
        let corner1 = Point::new(parse_coordinate("x1", x1)?, parse_coordinate("y1", y1)?);
        let corner2 = Point::new(parse_coordinate("x2", x2)?, parse_coordinate("y2", y2)?);
        Ok(Self::new(page, corner1, corner2))
    }
}

fn parse_page(raw: &str) -> Result<i64, PlacementError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| PlacementError::InvalidPageIndex(format!("'{}' is not a number", raw)))?;

    if !value.is_finite() {
        return Err(PlacementError::InvalidPageIndex(format!(
            "'{}' is not a finite number",
            raw
        )));
    }

    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return Err(PlacementError::InvalidPageIndex(format!(
            "'{}' is out of range",
            raw
        )));
    }

    Ok(truncated as i64)
}

fn parse_coordinate(axis: &'static str, raw: &str) -> Result<f64, PlacementError> {
    let invalid = || PlacementError::InvalidCoordinate {
        axis,
        value: raw.to_string(),
    };
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid())
    }
}
