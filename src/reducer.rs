use tracing::debug;
use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::grid::GridGeometry;
use crate::pagination::PageOutcome;
use crate::query::{QueryMode, TYPE_NAMES};
use crate::restore::{self, ReplayStep, RestorePhase, RestorePlan, ScrollReplay, ScrollState};
use crate::state::{AppState, Route};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let mut effects = vec![Effect::LoadSearchStats];
            match state.route.clone() {
                Route::List => {
                    if state.pager.items.is_empty() && state.pager.in_flight().is_none() {
                        let mode = state.current_mode();
                        effects.extend(reset_list(state, mode));
                    }
                    effects.extend(sync_sentinel(state));
                }
                Route::Detail(name) => {
                    if !state.detail.is_loaded() {
                        state.detail = DataResource::Loading;
                        effects.push(Effect::LoadPokemonDetail { name });
                    }
                }
            }
            DispatchResult::changed_with_many(effects)
        }

        // ===== Paging =====
        Action::PageDidLoad { request, page } => {
            if state.pager.apply(&request, page) == PageOutcome::Stale {
                debug!(
                    request_id = request.id,
                    offset = request.offset,
                    "discarding stale page"
                );
                return DispatchResult::unchanged();
            }
            let mut effects = match std::mem::take(&mut state.restore) {
                RestorePhase::AwaitingList(saved) if !request.append => {
                    continue_restore(state, saved)
                }
                RestorePhase::AwaitingItems { saved, request_id } if request_id == request.id => {
                    start_replay(state, saved.scroll_y)
                }
                other => {
                    state.restore = other;
                    Vec::new()
                }
            };
            effects.extend(sync_sentinel(state));
            DispatchResult::changed_with_many(effects)
        }

        Action::PageDidError { request, .. } => {
            if !state.pager.fail(&request) {
                return DispatchResult::unchanged();
            }
            if request.append {
                // The sentinel may still be on screen; let the next scroll or
                // resize page in again instead of waiting for it to leave.
                state.sentinel.rearm();
            }
            let effects = match std::mem::take(&mut state.restore) {
                RestorePhase::AwaitingItems { saved, request_id } if request_id == request.id => {
                    start_replay(state, saved.scroll_y)
                }
                RestorePhase::AwaitingList(_) => Vec::new(),
                other => {
                    state.restore = other;
                    Vec::new()
                }
            };
            DispatchResult::changed_with_many(effects)
        }

        // ===== List =====
        Action::ListScroll(delta) => scroll_by(state, isize::from(delta)),

        Action::ListPage(delta) => {
            let rows = GridGeometry::for_state(state).viewport_rows.max(1) as isize;
            scroll_by(state, rows * isize::from(delta))
        }

        Action::ListMove(delta) => select_by(state, isize::from(delta)),

        Action::ListMoveRow(delta) => {
            let columns = GridGeometry::for_state(state).columns as isize;
            select_by(state, columns * isize::from(delta))
        }

        Action::ListJumpTop => {
            if state.route != Route::List || state.pager.items.is_empty() {
                return DispatchResult::unchanged();
            }
            cancel_replay(state);
            state.selected = 0;
            state.scroll_y = 0;
            DispatchResult::changed_with_many(sync_sentinel(state))
        }

        Action::ListJumpBottom => {
            let len = state.pager.items.len();
            if state.route != Route::List || len == 0 {
                return DispatchResult::unchanged();
            }
            select_by(state, len as isize)
        }

        Action::ListRetry => {
            if state.route != Route::List || state.pager.in_flight().is_some() {
                return DispatchResult::unchanged();
            }
            if state.pager.items.is_empty() {
                let mode = state.current_mode();
                return DispatchResult::changed_with_many(reset_list(state, mode));
            }
            match state.pager.load_more() {
                Some(request) => DispatchResult::changed_with(Effect::FetchPage(request)),
                None => DispatchResult::unchanged(),
            }
        }

        Action::ListOpen => {
            if state.route != Route::List {
                return DispatchResult::unchanged();
            }
            let Some(name) = state.selected_pokemon().map(|pokemon| pokemon.name.clone()) else {
                return DispatchResult::unchanged();
            };
            state
                .session
                .save(state.scroll_y, state.pager.items.len());
            release_list(state);
            DispatchResult::changed_with_many(open_detail(state, name))
        }

        Action::ListRestoreAttempt => {
            let RestorePhase::Replaying(mut replay) = state.restore.clone() else {
                return DispatchResult::unchanged();
            };
            let max_scroll = GridGeometry::for_state(state).max_scroll();
            let mut effects = Vec::new();
            match replay.attempt(&mut state.scroll_y, max_scroll) {
                ReplayStep::Retry => {
                    state.restore = RestorePhase::Replaying(replay);
                    effects.push(Effect::ScheduleRestoreAttempt);
                }
                ReplayStep::Settled | ReplayStep::Exhausted => {
                    state.restore = RestorePhase::Idle;
                }
            }
            effects.extend(sync_sentinel(state));
            DispatchResult::changed_with_many(effects)
        }

        // ===== Search =====
        Action::SearchStart => {
            if state.search.active || state.route != Route::List {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchEnd => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.input.push(ch);
            search_edited(state)
        }

        Action::SearchBackspace => {
            if state.search.input.pop().is_none() {
                return DispatchResult::unchanged();
            }
            search_edited(state)
        }

        Action::SearchClear => {
            if state.search.input.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.input.clear();
            search_edited(state)
        }

        Action::SearchTrending(index) => {
            let Some(stat) = state.popular.get(index) else {
                return DispatchResult::unchanged();
            };
            state.search.input = stat.query.clone();
            state.search.active = false;
            search_edited(state)
        }

        Action::SearchCommit(query) => {
            if query != state.search.input {
                debug!(%query, "dropping superseded search commit");
                return DispatchResult::unchanged();
            }
            if query == state.search.committed {
                return DispatchResult::unchanged();
            }
            state.search.committed = query;
            apply_mode(state)
        }

        // ===== Type filter =====
        Action::TypeFilterNext => cycle_type(state, 1),
        Action::TypeFilterPrev => cycle_type(state, -1),

        Action::TypeFilterClear => {
            if state.type_filter.is_none() {
                return DispatchResult::unchanged();
            }
            state.type_filter = None;
            state.session.clear();
            apply_mode(state)
        }

        Action::TypeFilterToggleRow => {
            state.show_filters = !state.show_filters;
            DispatchResult::changed_with_many(sync_sentinel(state))
        }

        // ===== Detail =====
        Action::DetailBack => {
            if state.route == Route::List {
                return DispatchResult::unchanged();
            }
            state.route = Route::List;
            state.detail = DataResource::Empty;
            state.evolution_selected = 0;
            let mut effects = remount_list(state);
            effects.extend(begin_restore(state));
            effects.extend(sync_sentinel(state));
            DispatchResult::changed_with_many(effects)
        }

        Action::EvolutionMove(delta) => {
            let Some(count) = state.detail.data().map(|detail| detail.evolutions.len()) else {
                return DispatchResult::unchanged();
            };
            if count == 0 {
                return DispatchResult::unchanged();
            }
            let next = offset_index(state.evolution_selected, isize::from(delta), count);
            if next == state.evolution_selected {
                return DispatchResult::unchanged();
            }
            state.evolution_selected = next;
            DispatchResult::changed()
        }

        Action::EvolutionOpen => {
            let Some(stage) = state
                .detail
                .data()
                .and_then(|detail| detail.evolutions.get(state.evolution_selected))
                .map(|stage| stage.name.clone())
            else {
                return DispatchResult::unchanged();
            };
            if state.detail_name() == Some(stage.as_str()) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with_many(open_detail(state, stage))
        }

        Action::PokemonDidLoad(detail) => {
            if state.detail_name() != Some(detail.name.as_str()) {
                return DispatchResult::unchanged();
            }
            state.evolution_selected = detail
                .evolutions
                .iter()
                .position(|stage| stage.name == detail.name)
                .unwrap_or(0);
            state.detail = DataResource::Loaded(detail);
            DispatchResult::changed()
        }

        Action::PokemonDidError { name, error } => {
            if state.detail_name() != Some(name.as_str()) {
                return DispatchResult::unchanged();
            }
            state.detail = DataResource::Failed(error);
            DispatchResult::changed()
        }

        // ===== Stats =====
        Action::StatsDidLoad { popular, recent } => {
            state.popular = popular;
            state.recent = recent;
            DispatchResult::changed_with_many(sync_sentinel(state))
        }

        Action::StatsDidError(_) => DispatchResult::unchanged(),

        Action::StatsClear => {
            state.popular.clear();
            state.recent.clear();
            let mut effects = vec![Effect::ClearSearchStats];
            effects.extend(sync_sentinel(state));
            DispatchResult::changed_with_many(effects)
        }

        // ===== UI =====
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed_with_many(sync_sentinel(state))
        }

        Action::Tick => {
            if state.loading_anim_active() {
                state.tick_count = state.tick_count.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Re-evaluates the sentinel against the current layout and pages in more
/// results when it comes into view.
fn sync_sentinel(state: &mut AppState) -> Vec<Effect> {
    if state.route != Route::List || state.pager.items.is_empty() {
        state.sentinel.unmount();
        return Vec::new();
    }
    state.sentinel.mount();
    let geometry = GridGeometry::for_state(state);
    state.scroll_y = geometry.clamp_scroll(state.scroll_y);
    if state.sentinel.observe(&geometry, state.scroll_y) {
        if let Some(request) = state.pager.load_more() {
            return vec![Effect::FetchPage(request)];
        }
    }
    Vec::new()
}

fn reset_list(state: &mut AppState, mode: QueryMode) -> Vec<Effect> {
    state.scroll_y = 0;
    state.selected = 0;
    state.restore = RestorePhase::Idle;
    state.sentinel.unmount();
    vec![Effect::FetchPage(state.pager.reset(mode))]
}

fn release_list(state: &mut AppState) {
    state.pager.release();
    state.sentinel.unmount();
    state.restore = RestorePhase::Idle;
    state.scroll_y = 0;
}

/// Fresh list for the current mode: the initial page when it applies, a
/// first-page fetch otherwise.
fn remount_list(state: &mut AppState) -> Vec<Effect> {
    state.scroll_y = 0;
    let mode = state.current_mode();
    match (&mode, state.initial_page.clone()) {
        (QueryMode::All, Some(page)) => {
            state.pager.seed(mode, page);
            Vec::new()
        }
        _ => vec![Effect::FetchPage(state.pager.reset(mode))],
    }
}

fn begin_restore(state: &mut AppState) -> Vec<Effect> {
    let Some(saved) = state.session.take() else {
        return Vec::new();
    };
    if state.pager.is_loading_initial {
        state.restore = RestorePhase::AwaitingList(saved);
        return Vec::new();
    }
    continue_restore(state, saved)
}

fn continue_restore(state: &mut AppState, saved: ScrollState) -> Vec<Effect> {
    match restore::plan(&saved, state.pager.items.len()) {
        RestorePlan::FetchMissing { target } => match state.pager.fetch_missing(target) {
            Some(request) => {
                state.restore = RestorePhase::AwaitingItems {
                    saved,
                    request_id: request.id,
                };
                vec![Effect::FetchPage(request)]
            }
            None => start_replay(state, saved.scroll_y),
        },
        RestorePlan::Scroll { scroll_y } => start_replay(state, scroll_y),
        RestorePlan::Skip => {
            state.restore = RestorePhase::Idle;
            Vec::new()
        }
    }
}

fn start_replay(state: &mut AppState, target: usize) -> Vec<Effect> {
    let mut replay = ScrollReplay::new(target);
    let max_scroll = GridGeometry::for_state(state).max_scroll();
    match replay.attempt(&mut state.scroll_y, max_scroll) {
        ReplayStep::Retry => {
            state.restore = RestorePhase::Replaying(replay);
            vec![Effect::ScheduleRestoreAttempt]
        }
        ReplayStep::Settled | ReplayStep::Exhausted => {
            state.restore = RestorePhase::Idle;
            Vec::new()
        }
    }
}

/// User scrolling wins over a pending replay.
fn cancel_replay(state: &mut AppState) {
    if matches!(state.restore, RestorePhase::Replaying(_)) {
        state.restore = RestorePhase::Idle;
    }
}

fn open_detail(state: &mut AppState, name: String) -> Vec<Effect> {
    state.route = Route::Detail(name.clone());
    state.detail = DataResource::Loading;
    state.evolution_selected = 0;
    state.search.active = false;
    vec![
        Effect::LoadPokemonDetail { name: name.clone() },
        Effect::RecordVisit { name },
    ]
}

fn search_edited(state: &mut AppState) -> DispatchResult<Effect> {
    state.session.clear();
    DispatchResult::changed_with(Effect::DebounceSearch {
        query: state.search.input.clone(),
    })
}

/// Restarts the list when the query mode actually changed.
fn apply_mode(state: &mut AppState) -> DispatchResult<Effect> {
    let mode = state.current_mode();
    if state.route != Route::List || mode == state.pager.mode {
        return DispatchResult::changed();
    }
    DispatchResult::changed_with_many(reset_list(state, mode))
}

fn cycle_type(state: &mut AppState, delta: isize) -> DispatchResult<Effect> {
    let slots = TYPE_NAMES.len() as isize + 1;
    let current = state
        .type_filter
        .as_deref()
        .and_then(|name| TYPE_NAMES.iter().position(|candidate| *candidate == name))
        .map(|index| index as isize + 1)
        .unwrap_or(0);
    let next = (current + delta).rem_euclid(slots);
    state.type_filter = if next == 0 {
        None
    } else {
        Some(TYPE_NAMES[(next - 1) as usize].to_string())
    };
    state.session.clear();
    apply_mode(state)
}

fn scroll_by(state: &mut AppState, delta: isize) -> DispatchResult<Effect> {
    if state.route != Route::List {
        return DispatchResult::unchanged();
    }
    let geometry = GridGeometry::for_state(state);
    let next = geometry.clamp_scroll(state.scroll_y.saturating_add_signed(delta));
    cancel_replay(state);
    if next == state.scroll_y {
        // Pinned at an edge: a re-armed sentinel can still page in.
        let effects = sync_sentinel(state);
        if effects.is_empty() {
            return DispatchResult::unchanged();
        }
        return DispatchResult::changed_with_many(effects);
    }
    state.scroll_y = next;
    keep_selection_in_view(state, &geometry);
    DispatchResult::changed_with_many(sync_sentinel(state))
}

fn select_by(state: &mut AppState, delta: isize) -> DispatchResult<Effect> {
    let len = state.pager.items.len();
    if state.route != Route::List || len == 0 {
        return DispatchResult::unchanged();
    }
    let next = offset_index(state.selected.min(len - 1), delta, len);
    let geometry = GridGeometry::for_state(state);
    let scroll_y = geometry.reveal(state.scroll_y, next);
    if next == state.selected && scroll_y == state.scroll_y {
        return DispatchResult::unchanged();
    }
    cancel_replay(state);
    state.selected = next;
    state.scroll_y = scroll_y;
    DispatchResult::changed_with_many(sync_sentinel(state))
}

fn keep_selection_in_view(state: &mut AppState, geometry: &GridGeometry) {
    let top = geometry.card_top(state.selected);
    let visible = top >= state.scroll_y
        && top + crate::grid::CARD_HEIGHT <= state.scroll_y + geometry.viewport_rows;
    if !visible {
        let first_row = state.scroll_y.div_ceil(crate::grid::CARD_HEIGHT);
        let index = first_row * geometry.columns;
        state.selected = index.min(state.pager.items.len().saturating_sub(1));
    }
}

fn offset_index(current: usize, delta: isize, len: usize) -> usize {
    current
        .saturating_add_signed(delta)
        .min(len.saturating_sub(1))
}
