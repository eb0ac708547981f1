//! Offset pagination over the Pokemon listing.
//!
//! [`Paginator`] owns the result window for the active [`QueryMode`]. Every
//! request it hands out carries an id and the mode it was issued under, and
//! only the response to the current in-flight request is ever applied.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::query::QueryMode;
use crate::state::Pokemon;

pub const ITEMS_PER_PAGE: usize = 30;

/// A single page fetch handed to the effect layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageRequest {
    pub id: u64,
    pub mode: QueryMode,
    pub offset: usize,
    pub limit: usize,
    pub append: bool,
}

/// One page of results plus the total count for the mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page {
    pub items: Vec<Pokemon>,
    pub total_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    Applied,
    Stale,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Paginator {
    pub items: Vec<Pokemon>,
    pub total_count: usize,
    pub has_more: bool,
    pub mode: QueryMode,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    in_flight: Option<u64>,
    next_request_id: u64,
}

impl Paginator {
    /// Installs out-of-band initial data without issuing a request.
    pub fn seed(&mut self, mode: QueryMode, page: Page) {
        self.has_more = page.items.len() < page.total_count;
        self.items = page.items;
        self.total_count = page.total_count;
        self.mode = mode;
        self.in_flight = None;
        self.is_loading_initial = false;
        self.is_loading_more = false;
    }

    /// Discards the window and starts `mode` over from offset 0. Any request
    /// still in flight is superseded.
    pub fn reset(&mut self, mode: QueryMode) -> PageRequest {
        self.items.clear();
        self.total_count = 0;
        self.has_more = true;
        self.mode = mode;
        self.is_loading_initial = true;
        self.is_loading_more = false;
        self.issue(0, ITEMS_PER_PAGE, false)
    }

    /// Next page at `offset = items.len()`, unless a request is in flight or
    /// the listing is exhausted.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more {
            return None;
        }
        self.is_loading_more = true;
        Some(self.issue(self.offset(), ITEMS_PER_PAGE, true))
    }

    /// One request for exactly the items between the window and `target`.
    pub fn fetch_missing(&mut self, target: usize) -> Option<PageRequest> {
        let loaded = self.offset();
        if self.in_flight.is_some() || target <= loaded {
            return None;
        }
        self.is_loading_more = true;
        Some(self.issue(loaded, target - loaded, true))
    }

    pub fn apply(&mut self, request: &PageRequest, page: Page) -> PageOutcome {
        if !self.is_current(request) {
            return PageOutcome::Stale;
        }
        let received = page.items.len();
        if request.append {
            self.items.extend(page.items);
        } else {
            self.items = page.items;
        }
        self.total_count = page.total_count;
        self.has_more = request.offset + received < page.total_count;
        self.finish();
        PageOutcome::Applied
    }

    /// Clears the loading flags for a failed in-flight request. Returns false
    /// for a stale failure, which is ignored.
    pub fn fail(&mut self, request: &PageRequest) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.finish();
        true
    }

    /// Drops the window when the list is unmounted; outstanding responses
    /// become stale.
    pub fn release(&mut self) {
        self.items.clear();
        self.total_count = 0;
        self.has_more = true;
        self.finish();
    }

    /// Where the next append starts.
    fn offset(&self) -> usize {
        self.items.len()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading_initial || self.is_loading_more
    }

    fn is_current(&self, request: &PageRequest) -> bool {
        self.in_flight == Some(request.id) && request.mode == self.mode
    }

    fn issue(&mut self, offset: usize, limit: usize, append: bool) -> PageRequest {
        self.next_request_id += 1;
        self.in_flight = Some(self.next_request_id);
        PageRequest {
            id: self.next_request_id,
            mode: self.mode.clone(),
            offset,
            limit,
            append,
        }
    }

    fn finish(&mut self) {
        self.in_flight = None;
        self.is_loading_initial = false;
        self.is_loading_more = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pokemon_range(start: u32, count: usize) -> Vec<Pokemon> {
        (start..start + count as u32)
            .map(|id| Pokemon::new(id, format!("mon-{id}"), vec!["Normal".into()], None))
            .collect()
    }

    fn page(start: u32, count: usize, total: usize) -> Page {
        Page {
            items: pokemon_range(start, count),
            total_count: total,
        }
    }

    #[test]
    fn test_reset_requests_first_page() {
        let mut pager = Paginator::default();
        let request = pager.reset(QueryMode::Type("Fire".into()));

        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, ITEMS_PER_PAGE);
        assert!(!request.append);
        assert!(pager.is_loading_initial);
        assert!(pager.has_more);
    }

    #[test]
    fn test_has_more_tracks_total_count() {
        let mut pager = Paginator::default();
        let first = pager.reset(QueryMode::All);
        pager.apply(&first, page(1, 30, 45));
        assert!(pager.has_more);

        let second = pager.load_more().expect("second page");
        assert_eq!(second.offset, 30);
        pager.apply(&second, page(31, 15, 45));
        assert!(!pager.has_more);
        assert_eq!(pager.items.len(), 45);
        assert_eq!(pager.load_more(), None);
    }

    #[test]
    fn test_in_flight_guard() {
        let mut pager = Paginator::default();
        let first = pager.reset(QueryMode::All);
        assert_eq!(pager.load_more(), None);

        pager.apply(&first, page(1, 30, 100));
        assert!(pager.load_more().is_some());
        assert_eq!(pager.load_more(), None);
    }

    #[test]
    fn test_append_keeps_prefix() {
        let mut pager = Paginator::default();
        let first = pager.reset(QueryMode::All);
        pager.apply(&first, page(1, 30, 100));
        let before: Vec<u32> = pager.items.iter().map(|p| p.id).collect();

        let next = pager.load_more().expect("next page");
        pager.apply(&next, page(31, 30, 100));

        let after: Vec<u32> = pager.items.iter().map(|p| p.id).collect();
        assert_eq!(&after[..30], &before[..]);
        assert_eq!(after.len(), 60);
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut pager = Paginator::default();
        let all = pager.reset(QueryMode::All);
        let search = pager.reset(QueryMode::Search("char".into()));

        assert_eq!(pager.apply(&all, page(1, 30, 1000)), PageOutcome::Stale);
        assert!(pager.items.is_empty());
        assert!(pager.is_loading_initial);

        assert_eq!(pager.apply(&search, page(4, 3, 3)), PageOutcome::Applied);
        assert_eq!(pager.items.len(), 3);
        assert!(!pager.has_more);
    }

    #[test]
    fn test_failure_keeps_window() {
        let mut pager = Paginator::default();
        let first = pager.reset(QueryMode::All);
        pager.apply(&first, page(1, 30, 100));

        let next = pager.load_more().expect("next page");
        assert!(pager.fail(&next));
        assert_eq!(pager.items.len(), 30);
        assert_eq!(pager.total_count, 100);
        assert!(!pager.is_loading());
        assert!(pager.load_more().is_some());
    }

    #[test]
    fn test_fetch_missing_requests_exact_gap() {
        let mut pager = Paginator::default();
        pager.seed(QueryMode::All, page(1, 30, 1000));

        let request = pager.fetch_missing(90).expect("missing items");
        assert_eq!((request.offset, request.limit), (30, 60));
        assert!(request.append);
        assert_eq!(pager.fetch_missing(90), None);
    }

    #[test]
    fn test_release_makes_responses_stale() {
        let mut pager = Paginator::default();
        pager.seed(QueryMode::All, page(1, 30, 1000));
        let next = pager.load_more().expect("next page");
        pager.release();

        assert_eq!(pager.apply(&next, page(31, 30, 1000)), PageOutcome::Stale);
        assert!(pager.items.is_empty());
    }
}
