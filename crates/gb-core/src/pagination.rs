//! Fixed-size, 1-indexed pages over an ordered sequence

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Current page number and page size.
///
/// `number` is always at least 1 and `size` always greater than 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    number: usize,
    size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    /// First page with the given size (a zero size is bumped to 1)
    pub fn new(size: usize) -> Self {
        Self {
            number: 1,
            size: size.max(1),
        }
    }

    /// Same size, different page number (at least 1)
    pub fn with_number(self, number: usize) -> Self {
        Self {
            number: number.max(1),
            ..self
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of pages for `total` items, never less than 1
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.size).max(1)
    }

    /// Clamp the page number into `[1, total_pages(total)]`
    pub fn clamped(self, total: usize) -> Self {
        self.with_number(self.number.min(self.total_pages(total)))
    }

    /// Back to the first page
    pub fn reset(self) -> Self {
        self.with_number(1)
    }

    /// Item range covered by this page, truncated to `total`
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.number - 1).saturating_mul(self.size).min(total);
        let end = start.saturating_add(self.size).min(total);
        start..end
    }
}

/// Slice out one page. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: PageState) -> &[T] {
    &items[page.range(items.len())]
}
