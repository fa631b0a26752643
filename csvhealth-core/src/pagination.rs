//! Client-side pagination for the observations carousel.

use std::num::NonZeroUsize;

/// Return the items on `page_index` for pages of `page_size` items.
///
/// Pages past the end, and a zero page size, yield an empty slice.
pub fn page<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let Some(start) = page_index.checked_mul(page_size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `len` items.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Cursor over a fixed-length sequence with clamped navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_index: usize,
    page_size: NonZeroUsize,
    len: usize,
}

impl Paginator {
    /// Start on the first page.
    pub fn new(len: usize, page_size: NonZeroUsize) -> Self {
        Self {
            page_index: 0,
            page_size,
            len,
        }
    }

    /// Current zero-based page.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Items per page.
    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Total number of pages; zero when there are no items.
    pub fn page_count(&self) -> usize {
        page_count(self.len, self.page_size.get())
    }

    /// Whether `previous` would move.
    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Whether `next` would move.
    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    /// Move back one page; a no-op on the first page.
    pub fn previous(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    /// Move forward one page; a no-op on the last page.
    pub fn next(&mut self) {
        if self.has_next() {
            self.page_index += 1;
        }
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.page_size = page_size;
        self.page_index = 0;
    }

    /// Slice of `items` on the current page.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page(items, self.page_index, self.page_size.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    const ITEMS: [char; 5] = ['a', 'b', 'c', 'd', 'e'];

    #[test]
    fn page_slices_and_clips() {
        assert_eq!(page(&ITEMS, 0, 3), &['a', 'b', 'c']);
        assert_eq!(page(&ITEMS, 1, 3), &['d', 'e']);
        assert!(page(&ITEMS, 2, 3).is_empty());
        assert!(page(&ITEMS, usize::MAX, 3).is_empty());
        assert!(page(&ITEMS, 0, 0).is_empty());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 3), 0);
        assert_eq!(page_count(4, 3), 2);
        assert_eq!(page_count(3, 3), 1);
        assert_eq!(page_count(5, 1), 5);
    }

    #[test]
    fn previous_clamps_at_first_page() {
        let mut paginator = Paginator::new(ITEMS.len(), size(3));
        paginator.previous();
        assert_eq!(paginator.page_index(), 0);
        assert!(!paginator.has_previous());
    }

    #[test]
    fn next_clamps_at_last_page() {
        let mut paginator = Paginator::new(ITEMS.len(), size(3));
        paginator.next();
        assert_eq!(paginator.page_index(), 1);
        assert!(!paginator.has_next());
        paginator.next();
        assert_eq!(paginator.page_index(), 1);
        assert_eq!(paginator.visible(&ITEMS), &['d', 'e']);
    }

    #[test]
    fn navigation_is_a_no_op_without_items() {
        let empty: [char; 0] = [];
        let mut paginator = Paginator::new(0, size(3));
        assert_eq!(paginator.page_count(), 0);
        paginator.next();
        paginator.previous();
        assert_eq!(paginator.page_index(), 0);
        assert!(paginator.visible(&empty).is_empty());
    }

    #[test]
    fn changing_page_size_resets_index() {
        let mut paginator = Paginator::new(ITEMS.len(), size(1));
        paginator.next();
        paginator.next();
        assert_eq!(paginator.page_index(), 2);

        paginator.set_page_size(size(3));
        assert_eq!(paginator.page_index(), 0);
        assert_eq!(paginator.page_count(), 2);
        assert_eq!(paginator.visible(&ITEMS), &['a', 'b', 'c']);
    }
}
