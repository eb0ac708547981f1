//! Infinite-scroll trigger.
//!
//! The sentinel is the strip of rows right after the last card. The observer
//! watches it against the viewport extended by a margin and reports each
//! transition into visibility; paging decisions are left to the caller, which
//! reads the controller's state at that moment.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::grid::GridGeometry;

pub const SENTINEL_ROWS: usize = 2;
/// Rows below the viewport that already count as visible.
pub const SENTINEL_MARGIN_ROWS: usize = 8;
pub const VISIBILITY_THRESHOLD: f32 = 0.1;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SentinelObserver {
    mounted: bool,
    visible: bool,
    anchor: Option<usize>,
}

impl SentinelObserver {
    /// Starts observing; a fresh observer reports an already-visible sentinel.
    pub fn mount(&mut self) {
        if !self.mounted {
            *self = Self {
                mounted: true,
                ..Self::default()
            };
        }
    }

    pub fn unmount(&mut self) {
        *self = Self::default();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Forgets that the sentinel was seen, so the next observation of a
    /// visible sentinel counts as an entry again. Used after a failed fetch.
    pub fn rearm(&mut self) {
        self.visible = false;
    }

    /// Re-evaluates visibility for the current layout. Returns true only on a
    /// not-visible to visible transition. A sentinel that moved to a new row
    /// is observed afresh.
    pub fn observe(&mut self, geometry: &GridGeometry, scroll_y: usize) -> bool {
        if !self.mounted {
            return false;
        }
        let top = geometry.sentinel_top();
        if self.anchor != Some(top) {
            self.anchor = Some(top);
            self.visible = false;
        }
        let ratio = intersection_ratio(
            top,
            SENTINEL_ROWS,
            scroll_y,
            geometry.viewport_rows + SENTINEL_MARGIN_ROWS,
        );
        let now_visible = ratio >= VISIBILITY_THRESHOLD;
        let entered = now_visible && !self.visible;
        self.visible = now_visible;
        entered
    }
}

/// Fraction of the target rows that fall inside the view rows.
pub fn intersection_ratio(
    target_top: usize,
    target_rows: usize,
    view_top: usize,
    view_rows: usize,
) -> f32 {
    if target_rows == 0 {
        return 0.0;
    }
    let start = target_top.max(view_top);
    let end = (target_top + target_rows).min(view_top + view_rows);
    end.saturating_sub(start) as f32 / target_rows as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(items: usize) -> GridGeometry {
        // 4 columns, 20 visible rows
        GridGeometry::new(96, 20, items)
    }

    #[test]
    fn test_intersection_ratio() {
        assert_eq!(intersection_ratio(10, 2, 0, 10), 0.0);
        assert_eq!(intersection_ratio(10, 2, 0, 11), 0.5);
        assert_eq!(intersection_ratio(10, 2, 5, 20), 1.0);
    }

    #[test]
    fn test_unmounted_never_fires() {
        let mut observer = SentinelObserver::default();
        assert!(!observer.observe(&geometry(30), 100));
    }

    #[test]
    fn test_fires_once_per_entry() {
        let mut observer = SentinelObserver::default();
        observer.mount();
        let grid = geometry(60); // sentinel at row 60

        assert!(!observer.observe(&grid, 0));
        // viewport 20 + margin 8 reaches row 60 from scroll 33
        assert!(observer.observe(&grid, 33));
        assert!(!observer.observe(&grid, 34));
        assert!(!observer.observe(&grid, 0));
        assert!(observer.observe(&grid, 40));
    }

    #[test]
    fn test_mount_reports_visible_sentinel() {
        let mut observer = SentinelObserver::default();
        observer.mount();
        assert!(observer.observe(&geometry(8), 0));
    }

    #[test]
    fn test_rearmed_sentinel_fires_again() {
        let mut observer = SentinelObserver::default();
        observer.mount();
        let grid = geometry(8);
        assert!(observer.observe(&grid, 0));
        assert!(!observer.observe(&grid, 0));

        observer.rearm();
        assert!(observer.observe(&grid, 0));
    }

    #[test]
    fn test_moved_sentinel_is_observed_again() {
        let mut observer = SentinelObserver::default();
        observer.mount();
        assert!(observer.observe(&geometry(8), 0));
        // grew by one card row but still inside the viewport
        assert!(observer.observe(&geometry(12), 0));
        assert!(!observer.observe(&geometry(12), 0));
    }
}
