use serde::Serialize;

use crate::apis::doab::OffsetPagination;
use crate::apis::CursorPagination;

/// Window size for client-side slicing on the Home tab.
pub const RESULTS_PER_PAGE: usize = 10;
/// Width of the sliding page-number window.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// A pagination action requested from the UI. `Goto` only applies to the
/// Home tab's numbered page buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Previous,
    Next,
    Last,
    Goto(u32),
}

/// The one Previous/Next/Last contract every tab renders, whatever the
/// upstream paging protocol looks like.
#[derive(Debug, Clone, Serialize)]
pub struct PageControls {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub last_enabled: bool,
}

/// Controls for a cursor-paged tab. Enablement follows the presence of the
/// upstream URLs; the page count is display-only and defers to the
/// upstream's own signal that no further page exists.
pub fn cursor_controls(p: &CursorPagination) -> PageControls {
    let arithmetic_pages = if p.page_size == 0 {
        1
    } else {
        (p.total.div_ceil(p.page_size as u64) as u32).max(1)
    };
    let total_pages = if p.next.is_none() {
        p.page
    } else {
        arithmetic_pages.max(p.page)
    };
    PageControls {
        current_page: p.page,
        total_pages,
        total_results: p.total,
        prev_enabled: p.prev.is_some(),
        next_enabled: p.next.is_some(),
        last_enabled: p.last.is_some() && p.page != total_pages,
    }
}

/// Controls for the offset-paged Books tab.
pub fn offset_controls(p: &OffsetPagination) -> PageControls {
    PageControls {
        current_page: p.current_page,
        total_pages: p.total_pages,
        total_results: p.total_results,
        prev_enabled: p.has_previous,
        next_enabled: p.has_more,
        last_enabled: p.total_pages > 1 && p.current_page < p.total_pages,
    }
}

/// Controls for the client-side-paged Home tab.
pub fn local_controls(filtered_len: usize, current_page: u32) -> PageControls {
    let total_pages = (filtered_len.div_ceil(RESULTS_PER_PAGE) as u32).max(1);
    PageControls {
        current_page,
        total_pages,
        total_results: filtered_len as u64,
        prev_enabled: current_page > 1,
        next_enabled: current_page < total_pages,
        last_enabled: current_page < total_pages,
    }
}

/// Slice one Home-tab page out of the filtered list.
pub fn slice_page<T>(items: &[T], page: u32) -> &[T] {
    let start = (page.saturating_sub(1) as usize) * RESULTS_PER_PAGE;
    let end = (start + RESULTS_PER_PAGE).min(items.len());
    if start >= items.len() {
        &[]
    } else {
        &items[start..end]
    }
}

/// One element of the rendered page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// The sliding page-number window: up to five buttons recentered on the
/// current page, with the first and last page pinned behind ellipses when
/// the window is truncated.
pub fn page_window(current_page: u32, total_pages: u32) -> Vec<PageItem> {
    let (start, end) = if total_pages <= MAX_VISIBLE_PAGES {
        (1, total_pages)
    } else if current_page <= 3 {
        (1, MAX_VISIBLE_PAGES)
    } else if current_page >= total_pages - 2 {
        (total_pages - MAX_VISIBLE_PAGES + 1, total_pages)
    } else {
        (current_page - 2, current_page + 2)
    };

    let mut items = Vec::new();
    if start > 1 {
        items.push(PageItem::Page(1));
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    for page in start..=end {
        items.push(PageItem::Page(page));
    }
    if end < total_pages {
        if end < total_pages - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(total_pages));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    fn cursor(page: u32, total: u64, next: Option<&str>, last: Option<&str>) -> CursorPagination {
        CursorPagination {
            prev: None,
            next: next.map(str::to_string),
            page,
            page_size: 10,
            total,
            last: last.map(str::to_string),
        }
    }

    #[test]
    fn cursor_single_page_when_no_next_link() {
        // 12 results on one page, upstream says there is no next page.
        let controls = cursor_controls(&cursor(1, 12, None, None));
        assert_eq!(controls.total_pages, 1);
        assert!(!controls.next_enabled);
        assert!(!controls.prev_enabled);
        assert!(!controls.last_enabled);
    }

    #[test]
    fn cursor_multi_page_enables_next_and_last() {
        let controls = cursor_controls(&cursor(1, 240, Some("n"), Some("l")));
        assert_eq!(controls.total_pages, 24);
        assert!(controls.next_enabled);
        assert!(controls.last_enabled);
    }

    #[test]
    fn cursor_last_disabled_on_final_page() {
        let controls = cursor_controls(&cursor(24, 240, None, Some("l")));
        assert_eq!(controls.total_pages, 24);
        assert!(!controls.last_enabled);
    }

    #[test]
    fn offset_controls_follow_flags() {
        let controls = offset_controls(&OffsetPagination {
            current_page: 3,
            total_pages: 7,
            total_results: 130,
            has_previous: true,
            has_more: true,
            limit: 20,
        });
        assert!(controls.prev_enabled && controls.next_enabled && controls.last_enabled);
        assert_eq!(controls.total_pages, 7);
    }

    #[test]
    fn local_controls_ceil_pages() {
        let controls = local_controls(31, 1);
        assert_eq!(controls.total_pages, 4);
        assert!(!controls.prev_enabled);
        assert!(controls.next_enabled);

        let empty = local_controls(0, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.next_enabled);
    }

    #[test]
    fn slice_page_windows_of_ten() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(slice_page(&items, 1), (0..10).collect::<Vec<_>>());
        assert_eq!(slice_page(&items, 3), (20..25).collect::<Vec<_>>());
        assert!(slice_page(&items, 4).is_empty());
    }

    #[test]
    fn page_window_all_pages_when_few() {
        assert_eq!(page_window(2, 4), vec![Page(1), Page(2), Page(3), Page(4)]);
    }

    #[test]
    fn page_window_start_anchored() {
        assert_eq!(
            page_window(2, 9),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(9)]
        );
    }

    #[test]
    fn page_window_centered_with_both_ellipses() {
        assert_eq!(
            page_window(5, 9),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Page(7), Ellipsis, Page(9)]
        );
    }

    #[test]
    fn page_window_end_anchored() {
        assert_eq!(
            page_window(8, 9),
            vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Page(8), Page(9)]
        );
    }

    #[test]
    fn page_window_no_ellipsis_when_adjacent() {
        // start = 2: first page pinned without an ellipsis gap.
        assert_eq!(
            page_window(4, 6),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6)]
        );
    }
}
