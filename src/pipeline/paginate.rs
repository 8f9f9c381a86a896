//! Pagination: contiguous, order-preserving split of the rows into pages.

use crate::model::Dimension;

/// One page worth of rows, borrowed from the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub number: usize,
    /// Pages in the report.
    pub total: usize,
    pub dimensions: &'a [Dimension],
}

/// Number of pages needed for `rows` rows: `ceil(rows / capacity)`, at least 1.
pub fn page_count(rows: usize, capacity: usize) -> usize {
    rows.div_ceil(capacity.max(1)).max(1)
}

/// Split `dimensions` into pages of at most `capacity` rows.
///
/// An empty input still yields one (empty) page so every report has a
/// first page. A capacity of 0 is treated as 1.
pub fn paginate(dimensions: &[Dimension], capacity: usize) -> Vec<Page<'_>> {
    let capacity = capacity.max(1);
    let total = page_count(dimensions.len(), capacity);
    if dimensions.is_empty() {
        return vec![Page {
            number: 1,
            total,
            dimensions,
        }];
    }
    dimensions
        .chunks(capacity)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            total,
            dimensions: chunk,
        })
        .collect()
}
