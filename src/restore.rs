//! Scroll and dataset restoration across list -> detail -> list navigation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pagination::ITEMS_PER_PAGE;

pub const RESTORE_MAX_ATTEMPTS: u8 = 8;
pub const RESTORE_RETRY_MS: u64 = 100;
pub const RESTORE_TOLERANCE_ROWS: usize = 5;

/// Where the user was in the list when they left it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScrollState {
    pub scroll_y: usize,
    pub items_count: usize,
}

/// Session-scoped slot holding at most one saved [`ScrollState`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SessionSlot {
    saved: Option<ScrollState>,
}

impl SessionSlot {
    pub fn save(&mut self, scroll_y: usize, items_count: usize) {
        self.saved = Some(ScrollState {
            scroll_y,
            items_count,
        });
    }

    /// Consumes the saved state; a second call returns `None`.
    pub fn take(&mut self) -> Option<ScrollState> {
        self.saved.take()
    }

    pub fn clear(&mut self) {
        self.saved = None;
    }

    pub fn peek(&self) -> Option<&ScrollState> {
        self.saved.as_ref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestorePlan {
    /// Load `target - loaded` more items before scrolling.
    FetchMissing { target: usize },
    Scroll { scroll_y: usize },
    Skip,
}

/// Only a dataset that grew past the first page needs re-expanding.
pub fn plan(saved: &ScrollState, loaded: usize) -> RestorePlan {
    if saved.items_count > ITEMS_PER_PAGE && saved.items_count > loaded {
        RestorePlan::FetchMissing {
            target: saved.items_count,
        }
    } else if saved.scroll_y > 0 {
        RestorePlan::Scroll {
            scroll_y: saved.scroll_y,
        }
    } else {
        RestorePlan::Skip
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayStep {
    Settled,
    Retry,
    Exhausted,
}

/// Re-asserts a target scroll offset until it sticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScrollReplay {
    pub target: usize,
    pub attempts: u8,
}

impl ScrollReplay {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            attempts: 0,
        }
    }

    pub fn attempt(&mut self, scroll_y: &mut usize, max_scroll: usize) -> ReplayStep {
        self.attempts = self.attempts.saturating_add(1);
        *scroll_y = self.target.min(max_scroll);
        if scroll_y.abs_diff(self.target) <= RESTORE_TOLERANCE_ROWS {
            ReplayStep::Settled
        } else if self.attempts >= RESTORE_MAX_ATTEMPTS {
            ReplayStep::Exhausted
        } else {
            ReplayStep::Retry
        }
    }
}

/// Progress of an in-progress restoration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RestorePhase {
    #[default]
    Idle,
    /// The remounted list has not received its first page yet.
    AwaitingList(ScrollState),
    /// Waiting for the request that re-expands the dataset.
    AwaitingItems { saved: ScrollState, request_id: u64 },
    Replaying(ScrollReplay),
}

impl RestorePhase {
    pub fn is_active(&self) -> bool {
        !matches!(self, RestorePhase::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_is_consumed_once() {
        let mut slot = SessionSlot::default();
        slot.save(40, 90);
        assert_eq!(
            slot.take(),
            Some(ScrollState {
                scroll_y: 40,
                items_count: 90
            })
        );
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_plan_fetches_missing_items() {
        let saved = ScrollState {
            scroll_y: 40,
            items_count: 90,
        };
        assert_eq!(plan(&saved, 30), RestorePlan::FetchMissing { target: 90 });
        assert_eq!(plan(&saved, 90), RestorePlan::Scroll { scroll_y: 40 });
    }

    #[test]
    fn test_plan_first_page_only_scrolls() {
        let saved = ScrollState {
            scroll_y: 6,
            items_count: 30,
        };
        assert_eq!(plan(&saved, 30), RestorePlan::Scroll { scroll_y: 6 });
        let top = ScrollState {
            scroll_y: 0,
            items_count: 12,
        };
        assert_eq!(plan(&top, 30), RestorePlan::Skip);
    }

    #[test]
    fn test_replay_settles_when_reachable() {
        let mut replay = ScrollReplay::new(40);
        let mut scroll_y = 0;
        assert_eq!(replay.attempt(&mut scroll_y, 100), ReplayStep::Settled);
        assert_eq!(scroll_y, 40);
    }

    #[test]
    fn test_replay_gives_up_after_max_attempts() {
        let mut replay = ScrollReplay::new(80);
        let mut scroll_y = 0;
        for _ in 1..RESTORE_MAX_ATTEMPTS {
            assert_eq!(replay.attempt(&mut scroll_y, 20), ReplayStep::Retry);
        }
        assert_eq!(replay.attempt(&mut scroll_y, 20), ReplayStep::Exhausted);
        assert_eq!(scroll_y, 20);
    }
}
