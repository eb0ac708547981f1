//! Card grid geometry, shared by the reducer and the renderer.
//!
//! Everything is measured in terminal rows: cards are `CARD_HEIGHT` rows tall,
//! the sentinel sits right after the last card row, and `scroll_y` is the first
//! content row visible in the viewport.

use crate::sentinel::SENTINEL_ROWS;
use crate::state::AppState;

pub const CARD_WIDTH: u16 = 24;
pub const CARD_HEIGHT: usize = 4;

pub const HEADER_ROWS: u16 = 3;
pub const SEARCH_ROWS: u16 = 3;
pub const FILTER_ROWS: u16 = 3;
pub const TRENDING_ROWS: u16 = 4;
pub const FOOTER_ROWS: u16 = 3;
const GRID_BORDER: u16 = 2;

/// Row heights of the list route, top to bottom; zero means hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListChrome {
    pub header: u16,
    pub search: u16,
    pub filters: u16,
    pub trending: u16,
    pub footer: u16,
}

impl ListChrome {
    pub fn for_state(state: &AppState) -> Self {
        Self {
            header: HEADER_ROWS,
            search: SEARCH_ROWS,
            filters: if state.show_filters { FILTER_ROWS } else { 0 },
            trending: if state.trending_visible() {
                TRENDING_ROWS
            } else {
                0
            },
            footer: FOOTER_ROWS,
        }
    }

    pub fn total(&self) -> u16 {
        self.header + self.search + self.filters + self.trending + self.footer
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub columns: usize,
    pub viewport_rows: usize,
    pub item_count: usize,
}

impl GridGeometry {
    /// `inner_width` and `viewport_rows` are measured inside the grid border.
    pub fn new(inner_width: u16, viewport_rows: u16, item_count: usize) -> Self {
        Self {
            columns: usize::from((inner_width / CARD_WIDTH).max(1)),
            viewport_rows: usize::from(viewport_rows),
            item_count,
        }
    }

    pub fn for_state(state: &AppState) -> Self {
        let (width, height) = state.terminal_size;
        let chrome = ListChrome::for_state(state);
        let viewport = height.saturating_sub(chrome.total() + GRID_BORDER);
        Self::new(
            width.saturating_sub(GRID_BORDER),
            viewport,
            state.pager.items.len(),
        )
    }

    pub fn item_rows(&self) -> usize {
        self.item_count.div_ceil(self.columns)
    }

    /// First content row of the sentinel.
    pub fn sentinel_top(&self) -> usize {
        self.item_rows() * CARD_HEIGHT
    }

    /// The sentinel is only laid out while there are items.
    pub fn content_rows(&self) -> usize {
        if self.item_count == 0 {
            0
        } else {
            self.sentinel_top() + SENTINEL_ROWS
        }
    }

    pub fn max_scroll(&self) -> usize {
        self.content_rows().saturating_sub(self.viewport_rows)
    }

    pub fn clamp_scroll(&self, scroll_y: usize) -> usize {
        scroll_y.min(self.max_scroll())
    }

    pub fn card_top(&self, index: usize) -> usize {
        (index / self.columns) * CARD_HEIGHT
    }

    /// Smallest scroll change that keeps the card at `index` fully visible.
    pub fn reveal(&self, scroll_y: usize, index: usize) -> usize {
        let top = self.card_top(index);
        let bottom = top + CARD_HEIGHT;
        if top < scroll_y {
            top
        } else if bottom > scroll_y + self.viewport_rows {
            self.clamp_scroll(bottom.saturating_sub(self.viewport_rows))
        } else {
            scroll_y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_never_zero() {
        let geometry = GridGeometry::new(10, 20, 5);
        assert_eq!(geometry.columns, 1);
        assert_eq!(geometry.item_rows(), 5);
    }

    #[test]
    fn test_content_includes_sentinel() {
        let geometry = GridGeometry::new(96, 20, 30);
        assert_eq!(geometry.columns, 4);
        assert_eq!(geometry.item_rows(), 8);
        assert_eq!(geometry.sentinel_top(), 32);
        assert_eq!(geometry.content_rows(), 32 + SENTINEL_ROWS);
        assert_eq!(geometry.max_scroll(), 32 + SENTINEL_ROWS - 20);
    }

    #[test]
    fn test_empty_grid_has_no_content() {
        let geometry = GridGeometry::new(96, 20, 0);
        assert_eq!(geometry.content_rows(), 0);
        assert_eq!(geometry.clamp_scroll(12), 0);
    }

    #[test]
    fn test_reveal_scrolls_minimally() {
        let geometry = GridGeometry::new(96, 10, 60);
        assert_eq!(geometry.reveal(0, 3), 0);
        // Row 3 spans 12..16; a 10-row viewport must start at 6.
        assert_eq!(geometry.reveal(0, 12), 6);
        assert_eq!(geometry.reveal(20, 0), 0);
    }
}
