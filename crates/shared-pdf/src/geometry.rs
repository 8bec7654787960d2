//! Page geometry inspection

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use placement_core::PageGeometry;

use crate::error::PdfInspectError;
use crate::object::{dict_entry, number, resolve};

/// Page tree levels walked when looking for an inherited MediaBox
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Reads page count and reference page size from a document on disk
pub trait PageInspector {
    fn inspect(&self, path: &Path) -> Result<PageGeometry, PdfInspectError>;
}

/// `lopdf`-backed inspector
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfInspector;

impl PageInspector for LopdfInspector {
    fn inspect(&self, path: &Path) -> Result<PageGeometry, PdfInspectError> {
        let doc = crate::open_document(path)?;
        Ok(geometry_of(&doc))
    }
}

/// Geometry of an already parsed document.
///
/// Size comes from the first page. Without a usable MediaBox only the
/// page count is reported.
pub fn geometry_of(doc: &Document) -> PageGeometry {
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;

    let size = pages
        .values()
        .next()
        .and_then(|id| doc.get_dictionary(*id).ok())
        .and_then(|page| media_box_size(doc, page));

    match size {
        Some((width, height)) => {
            tracing::debug!(page_count, width, height, "Read page geometry");
            PageGeometry::new(page_count, width, height)
        }
        None => {
            tracing::warn!(page_count, "No usable MediaBox on first page");
            PageGeometry::count_only(page_count)
        }
    }
}

fn media_box_size(doc: &Document, page: &Dictionary) -> Option<(f64, f64)> {
    let mut node = page;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Some(media_box) = dict_entry(doc, node, b"MediaBox") {
            return box_size(doc, media_box);
        }
        node = dict_entry(doc, node, b"Parent")?.as_dict().ok()?;
    }
    None
}

fn box_size(doc: &Document, media_box: &Object) -> Option<(f64, f64)> {
    let values = resolve(doc, media_box)?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let coords: Vec<f64> = values
        .iter()
        .map(|v| number(doc, v))
        .collect::<Option<_>>()?;

    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
        Some((width, height))
    } else {
        None
    }
}
