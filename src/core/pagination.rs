//! Page math shared by every paginated wizard view.
//!
//! All list flows show a fixed number of items per page and clamp the
//! requested page into the valid range, so navigating past either end is
//! harmless. An empty collection still has one (empty) page so the embeds
//! always have a "Page 1/1" footer to render.

/// Items per page for food and category lists.
pub const CATALOG_PAGE_SIZE: usize = 4;
/// Items per page for the bank list.
pub const BANK_PAGE_SIZE: usize = 10;
/// Items per page for the kiss image removal preview.
pub const KISS_PAGE_SIZE: usize = 5;

/// A clamped view onto one page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based current page, always in `[1, total]`
    pub current: usize,
    /// Total number of pages, at least 1
    pub total: usize,
    page_size: usize,
}

impl Page {
    /// Computes the page for a collection of `item_count` items, clamping the
    /// 1-based `requested` page into range.
    #[must_use]
    pub fn clamped(requested: i64, item_count: usize, page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be positive");
        let total = item_count.div_ceil(page_size).max(1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let current = requested.clamp(1, total as i64) as usize;
        Self {
            current,
            total,
            page_size,
        }
    }

    /// Slice of the items that fall on this page.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        if start >= items.len() {
            &[]
        } else {
            &items[start..end]
        }
    }

    /// Whether a Previous button should be disabled.
    #[must_use]
    pub const fn at_first(&self) -> bool {
        self.current <= 1
    }

    /// Whether a Next button should be disabled.
    #[must_use]
    pub const fn at_last(&self) -> bool {
        self.current >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling_of_count_over_size() {
        assert_eq!(Page::clamped(1, 0, 4).total, 1);
        assert_eq!(Page::clamped(1, 1, 4).total, 1);
        assert_eq!(Page::clamped(1, 4, 4).total, 1);
        assert_eq!(Page::clamped(1, 5, 4).total, 2);
        assert_eq!(Page::clamped(1, 8, 4).total, 2);
        assert_eq!(Page::clamped(1, 9, 4).total, 3);
    }

    #[test]
    fn test_requested_page_is_clamped_into_range() {
        let page = Page::clamped(0, 9, 4);
        assert_eq!(page.current, 1);
        let page = Page::clamped(-3, 9, 4);
        assert_eq!(page.current, 1);
        let page = Page::clamped(99, 9, 4);
        assert_eq!(page.current, 3);
        let page = Page::clamped(2, 9, 4);
        assert_eq!(page.current, 2);
    }

    #[test]
    fn test_slice_returns_the_right_window() {
        let items: Vec<u32> = (0..9).collect();
        assert_eq!(Page::clamped(1, items.len(), 4).slice(&items), &[0, 1, 2, 3]);
        assert_eq!(Page::clamped(2, items.len(), 4).slice(&items), &[4, 5, 6, 7]);
        assert_eq!(Page::clamped(3, items.len(), 4).slice(&items), &[8]);
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = Page::clamped(1, 0, 10);
        assert_eq!((page.current, page.total), (1, 1));
        assert!(page.slice(&items).is_empty());
        assert!(page.at_first());
        assert!(page.at_last());
    }

    #[test]
    fn test_boundary_flags_drive_button_state() {
        let first = Page::clamped(1, 20, 10);
        assert!(first.at_first());
        assert!(!first.at_last());
        let last = Page::clamped(2, 20, 10);
        assert!(!last.at_first());
        assert!(last.at_last());
    }
}
