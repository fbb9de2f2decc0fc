//! Server-side pagination state: a 1-based page and a page size.

use crate::types::PageRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Number of pages for `total` items, never less than 1.
    pub fn total_pages(&self, total: u64) -> u32 {
        let pages = total.div_ceil(self.per_page as u64).max(1);
        pages.min(u32::MAX as u64) as u32
    }

    /// Jump to `page`, clamped into range. Returns true if the page changed.
    pub fn set_page(&mut self, page: u32, total: u64) -> bool {
        let clamped = page.clamp(1, self.total_pages(total));
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    pub fn next(&mut self, total: u64) -> bool {
        self.set_page(self.page.saturating_add(1), total)
    }

    pub fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn first(&mut self) -> bool {
        let changed = self.page != 1;
        self.page = 1;
        changed
    }

    pub fn last(&mut self, total: u64) -> bool {
        self.set_page(self.total_pages(total), total)
    }

    /// Changing the page size always returns to the first page.
    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    /// `"11-20 of 1302"` style label. `shown` is the number of rows on this page.
    pub fn range_label(&self, total: u64, shown: usize) -> String {
        if shown == 0 {
            return format!("0 of {total}");
        }
        let from = self.offset() + 1;
        let to = self.offset() + shown as u64;
        format!("{from}-{to} of {total}")
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn zero_inputs_are_normalized() {
        let p = Pagination::new(0, 0);
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
        assert_eq!(p.total_pages(1302), 131);
    }

    #[test]
    fn next_and_prev_stay_in_bounds() {
        let mut p = Pagination::new(1, 10);
        assert!(!p.prev());
        assert!(p.next(25));
        assert!(p.next(25));
        assert_eq!(p.page(), 3);
        assert!(!p.next(25));
        assert!(p.prev());
        assert_eq!(p.page(), 2);
    }

    #[test]
    fn first_and_last() {
        let mut p = Pagination::new(4, 10);
        assert!(p.last(95));
        assert_eq!(p.page(), 10);
        assert!(!p.last(95));
        assert!(p.first());
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn per_page_change_resets_page() {
        let mut p = Pagination::new(7, 10);
        p.set_per_page(25);
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), 25);
    }

    #[test]
    fn range_label_uses_rows_shown() {
        let p = Pagination::new(2, 10);
        assert_eq!(p.range_label(1302, 10), "11-20 of 1302");
        assert_eq!(Pagination::new(131, 10).range_label(1302, 2), "1301-1302 of 1302");
        assert_eq!(p.range_label(0, 0), "0 of 0");
    }
}
