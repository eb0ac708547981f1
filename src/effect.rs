use crate::pagination::PageRequest;

/// Quiet period before typed search text becomes the committed query.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage(PageRequest),
    /// Commit `query` once the input has been quiet for the debounce window
    DebounceSearch { query: String },
    LoadPokemonDetail { name: String },
    RecordVisit { name: String },
    LoadSearchStats,
    ClearSearchStats,
    /// Wake the restoration replay after the retry interval
    ScheduleRestoreAttempt,
}
