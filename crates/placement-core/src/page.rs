//! Page index resolution
//!
//! Callers send either one-based or zero-based page numbers. The decision
//! table below is evaluated top to bottom, first match wins:
//!
//! | Condition                          | Interpretation      | Index          |
//! |------------------------------------|---------------------|----------------|
//! | page count unknown, page >= 0      | unchecked           | page           |
//! | 1 <= page <= count                 | one-based           | page - 1       |
//! | 0 <= page < count                  | zero-based          | page           |
//! | page == count + 1                  | off-by-one overflow | page - 1       |
//! | anything else                      | error               |                |
//!
//! Values in `1..count` are ambiguous; they always resolve as one-based.

use serde::Serialize;

use crate::error::PlacementError;

/// How the requested page number was read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageInterpretation {
    /// Page count unknown, value taken as zero-based without checking
    Unchecked,
    OneBased,
    ZeroBased,
    /// `count + 1` accepted as a one-based value one past the end
    OffByOneOverflow,
}

/// Resolve a caller page number into a zero-based page index
pub fn resolve_page_index(
    requested: i64,
    page_count: Option<u32>,
) -> Result<(u32, PageInterpretation), PlacementError> {
    let Some(count) = page_count else {
        if requested < 0 {
            return Err(PlacementError::InvalidPageIndex(format!(
                "page {} is negative and the page count is unknown",
                requested
            )));
        }
        let index = u32::try_from(requested).map_err(|_| {
            PlacementError::InvalidPageIndex(format!("page {} is too large", requested))
        })?;
        tracing::warn!(
            requested,
            "Page count unknown, using requested page as zero-based index"
        );
        return Ok((index, PageInterpretation::Unchecked));
    };

    let count = i64::from(count);

    let resolved = if (1..=count).contains(&requested) {
        (requested - 1, PageInterpretation::OneBased)
    } else if (0..count).contains(&requested) {
        (requested, PageInterpretation::ZeroBased)
    } else if requested == count + 1 {
        tracing::warn!(
            requested,
            page_count = count,
            "Page one past the end, applying off-by-one adjustment"
        );
        (requested - 1, PageInterpretation::OffByOneOverflow)
    } else {
        return Err(PlacementError::PageOutOfRange {
            requested,
            page_count: count as u32,
            max_accepted: count as u64 + 1,
        });
    };

    // Every branch above yields a value in 0..=count, which fits in u32
    Ok((resolved.0 as u32, resolved.1))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// One-based values inside the document map to value - 1
        #[test]
        fn one_based_values_shift_down(count in 1u32..500, offset in 0u32..500) {
            let requested = 1 + (offset % count);
            let (index, interpretation) =
                resolve_page_index(i64::from(requested), Some(count)).unwrap();
            prop_assert_eq!(index, requested - 1);
            prop_assert_eq!(interpretation, PageInterpretation::OneBased);
        }

        /// Resolved indices never exceed the page count
        #[test]
        fn resolved_index_is_bounded(count in 0u32..500, requested in -10i64..600) {
            if let Ok((index, _)) = resolve_page_index(requested, Some(count)) {
                prop_assert!(index <= count);
                prop_assert!(requested >= 0 && requested <= i64::from(count) + 1);
            }
        }

        /// Anything beyond count + 1 is rejected
        #[test]
        fn far_pages_are_rejected(count in 0u32..500, extra in 2i64..1000) {
            let requested = i64::from(count) + extra;
            let result = resolve_page_index(requested, Some(count));
            let is_out_of_range = matches!(result, Err(PlacementError::PageOutOfRange { .. }));
            prop_assert!(is_out_of_range);
        }
    }
}
