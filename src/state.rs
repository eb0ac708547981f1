//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::pagination::{Page, Paginator};
use crate::query::{self, QueryMode, RouteQuery};
use crate::restore::{RestorePhase, SessionSlot};
use crate::sentinel::SentinelObserver;

const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

pub const TRENDING_LIMIT: usize = 10;
pub const RECENT_LIMIT: usize = 5;
pub const LOADING_ANIM_TICK_MS: u64 = 120;

/// A Pokemon as shown on a grid card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    pub number: String,
    pub types: Vec<String>,
    pub image: String,
}

impl Pokemon {
    /// `image` falls back to the official artwork URL for `id`.
    pub fn new(id: u32, name: String, types: Vec<String>, image: Option<String>) -> Self {
        Self {
            id,
            name,
            number: format!("{id:03}"),
            types,
            image: image.unwrap_or_else(|| official_artwork_url(id)),
        }
    }

    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PokemonStat {
    pub name: String,
    pub value: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvolutionStage {
    pub id: u32,
    pub name: String,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    pub number: String,
    pub height: u16,
    pub weight: u16,
    pub base_experience: Option<u32>,
    pub types: Vec<String>,
    pub stats: Vec<PokemonStat>,
    pub abilities: Vec<String>,
    pub image: String,
    pub flavor_text: Option<String>,
    pub evolutions: Vec<EvolutionStage>,
}

/// Visit counter for one normalized Pokemon name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchStat {
    pub query: String,
    pub count: u32,
    /// Unix milliseconds
    #[serde(rename = "lastSearched")]
    pub last_searched: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Route {
    #[default]
    List,
    Detail(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchState {
    /// Input has keyboard focus
    pub active: bool,
    /// Raw text as typed
    pub input: String,
    /// Last value that survived the debounce
    pub committed: String,
}

#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    #[debug(section = "Route", label = "Route", debug_fmt)]
    pub route: Route,

    #[debug(section = "Query", label = "Search", debug_fmt)]
    pub search: SearchState,

    #[debug(section = "Query", label = "Type", debug_fmt)]
    pub type_filter: Option<String>,

    #[debug(section = "Query", label = "Filters shown")]
    pub show_filters: bool,

    #[debug(section = "List", label = "Pager", debug_fmt)]
    pub pager: Paginator,

    /// First `All` page fetched before the UI started; reused on remount.
    #[debug(skip)]
    pub initial_page: Option<Page>,

    #[debug(section = "List", label = "Scroll")]
    pub scroll_y: usize,

    #[debug(section = "List", label = "Selected")]
    pub selected: usize,

    #[debug(section = "List", label = "Sentinel", debug_fmt)]
    pub sentinel: SentinelObserver,

    #[debug(section = "Restore", label = "Session", debug_fmt)]
    pub session: SessionSlot,

    #[debug(section = "Restore", label = "Phase", debug_fmt)]
    pub restore: RestorePhase,

    #[debug(section = "Detail", label = "Pokemon", debug_fmt)]
    pub detail: DataResource<PokemonDetail>,

    #[debug(section = "Detail", label = "Evolution")]
    pub evolution_selected: usize,

    #[debug(section = "Stats", label = "Popular", debug_fmt)]
    pub popular: Vec<SearchStat>,

    #[debug(section = "Stats", label = "Recent", debug_fmt)]
    pub recent: Vec<SearchStat>,

    #[debug(section = "Stats", label = "Backend")]
    pub stats_backend: String,

    #[debug(skip)]
    pub terminal_size: (u16, u16),

    #[debug(skip)]
    pub tick_count: u32,
}

impl AppState {
    /// Builds the first state from the route parameters and the initial page.
    /// The initial page only seeds the list when the route implies `All`.
    pub fn new(route: RouteQuery, initial_page: Option<Page>) -> Self {
        let committed = route.name.clone().unwrap_or_default();
        let mut state = Self {
            route: Route::List,
            search: SearchState {
                active: false,
                input: committed.clone(),
                committed,
            },
            type_filter: route.type_name,
            show_filters: true,
            pager: Paginator::default(),
            initial_page,
            scroll_y: 0,
            selected: 0,
            sentinel: SentinelObserver::default(),
            session: SessionSlot::default(),
            restore: RestorePhase::Idle,
            detail: DataResource::Empty,
            evolution_selected: 0,
            popular: Vec::new(),
            recent: Vec::new(),
            stats_backend: "local".to_string(),
            terminal_size: (100, 40),
            tick_count: 0,
        };
        if state.current_mode() == QueryMode::All {
            if let Some(page) = state.initial_page.clone() {
                state.pager.seed(QueryMode::All, page);
            }
        }
        state
    }

    pub fn current_mode(&self) -> QueryMode {
        query::mode(&self.search.committed, self.type_filter.as_deref())
    }

    pub fn route_query(&self) -> RouteQuery {
        RouteQuery::new(&self.search.committed, self.type_filter.as_deref())
    }

    pub fn is_query_active(&self) -> bool {
        self.current_mode().is_filtered()
    }

    /// Trending searches sit above the grid on the unfiltered listing.
    pub fn trending_visible(&self) -> bool {
        self.route == Route::List
            && !self.is_query_active()
            && !self.pager.items.is_empty()
            && !self.popular.is_empty()
    }

    pub fn selected_pokemon(&self) -> Option<&Pokemon> {
        self.pager.items.get(self.selected)
    }

    pub fn detail_name(&self) -> Option<&str> {
        match &self.route {
            Route::Detail(name) => Some(name),
            Route::List => None,
        }
    }

    pub fn loading_anim_active(&self) -> bool {
        self.pager.is_loading() || self.detail.is_loading()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RouteQuery::default(), None)
    }
}

pub fn official_artwork_url(id: u32) -> String {
    format!("{ARTWORK_BASE}/{id}.png")
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
