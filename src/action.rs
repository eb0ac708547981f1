use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pagination::{Page, PageRequest};
use crate::state::{PokemonDetail, SearchStat};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,

    // ===== Page category =====
    PageDidLoad { request: PageRequest, page: Page },
    PageDidError { request: PageRequest, error: String },

    // ===== List category =====
    /// Scroll the grid by rows, positive is down
    ListScroll(i16),
    /// Scroll by whole viewports
    ListPage(i16),
    /// Move the card selection by cards
    ListMove(i16),
    /// Move the card selection by grid rows
    ListMoveRow(i16),
    ListJumpTop,
    ListJumpBottom,
    /// Fetch again after a failed page: the first page when nothing is
    /// loaded, the next one otherwise
    ListRetry,
    /// Open the selected card's detail view
    ListOpen,
    /// Re-assert the restored scroll offset
    ListRestoreAttempt,

    // ===== Search category =====
    SearchStart,
    SearchEnd,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    /// Debounced value of the search input
    SearchCommit(String),
    /// Fill the search input from the trending row (0-based)
    SearchTrending(usize),

    // ===== Type filter category =====
    TypeFilterNext,
    TypeFilterPrev,
    TypeFilterClear,
    TypeFilterToggleRow,

    // ===== Detail category =====
    DetailBack,
    EvolutionMove(i16),
    EvolutionOpen,
    PokemonDidLoad(PokemonDetail),
    PokemonDidError { name: String, error: String },

    // ===== Stats category =====
    StatsDidLoad {
        popular: Vec<SearchStat>,
        recent: Vec<SearchStat>,
    },
    StatsDidError(String),
    StatsClear,

    // ===== UI category =====
    UiTerminalResize(u16, u16),

    Tick,
    Quit,
}
