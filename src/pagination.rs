use std::ops::Range;

/// Most page buttons shown at once.
pub const PAGE_WINDOW: usize = 5;

pub fn total_pages(count: usize, page_size: usize) -> usize {
    std::cmp::max(1, count.div_ceil(page_size.max(1)))
}

pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Index range of `page` (1-based) within a result of `count` rows.
pub fn page_bounds(page: usize, page_size: usize, count: usize) -> Range<usize> {
    let begin = std::cmp::min(page.saturating_sub(1) * page_size, count);
    let end = std::cmp::min(begin + page_size, count);
    begin..end
}

/// Page numbers to offer as buttons. Centered on `current` except near
/// either end, where the window is anchored to the first or last page.
pub fn page_window(current: usize, total: usize) -> Vec<usize> {
    if total <= PAGE_WINDOW {
        return (1..=total).collect();
    }
    let half = PAGE_WINDOW / 2;
    let start = if current <= half + 1 {
        1
    } else if current >= total - half {
        total - PAGE_WINDOW + 1
    } else {
        current - half
    };
    (start..start + PAGE_WINDOW).collect()
}

/// The pagination control row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub pages: Vec<usize>,
    pub current: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagination {
    /// `None` when everything fits on one page.
    pub fn new(current: usize, total: usize) -> Option<Self> {
        if total <= 1 {
            return None;
        }
        let current = clamp_page(current, total);
        Some(Self {
            pages: page_window(current, total),
            current,
            total,
            has_previous: current > 1,
            has_next: current < total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(12, 10), 2);
        assert_eq!(total_pages(23, 10), 3);
    }

    #[test]
    fn bounds_of_last_partial_page() {
        assert_eq!(page_bounds(3, 10, 23), 20..23);
        assert_eq!(page_bounds(1, 10, 0), 0..0);
        assert_eq!(page_bounds(5, 10, 23), 23..23);
    }

    #[test]
    fn small_totals_show_every_page() {
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(4, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn window_is_anchored_near_the_ends() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(8, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn window_is_centered_in_the_middle() {
        assert_eq!(page_window(4, 10), vec![2, 3, 4, 5, 6]);
        assert_eq!(page_window(7, 10), vec![5, 6, 7, 8, 9]);
        assert_eq!(page_window(4, 6), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn pagination_row_omitted_for_single_page() {
        assert_eq!(Pagination::new(1, 1), None);
        let p = Pagination::new(3, 3).unwrap();
        assert!(p.has_previous);
        assert!(!p.has_next);
        assert_eq!(p.pages, vec![1, 2, 3]);
    }
}
