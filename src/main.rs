//! Pokédex TUI: debounced search, type filters and an endless card grid

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::api::PokeApi;
use pokedex::config::{AppArgs, AppConfig};
use pokedex::effect::{Effect, SEARCH_DEBOUNCE_MS};
use pokedex::logging;
use pokedex::pagination::{Page, ITEMS_PER_PAGE};
use pokedex::query::{self, QueryMode};
use pokedex::reducer::reducer;
use pokedex::restore::RESTORE_RETRY_MS;
use pokedex::state::{AppState, LOADING_ANIM_TICK_MS, RECENT_LIMIT, TRENDING_LIMIT};
use pokedex::stats::{self, SearchStatsStore};
use pokedex::ui::{PokedexComponentId, PokedexContext, PokedexUi};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse every Pokémon with search, type filters and endless scrolling")]
struct Args {
    #[command(flatten)]
    app: AppArgs,

    #[command(flatten)]
    debug: DebugCliArgs,
}

/// Long-lived handles the effect handler clones into tasks.
#[derive(Clone)]
struct Services {
    api: PokeApi,
    stats: Arc<dyn SearchStatsStore>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args { app, debug: debug_args } = Args::parse();
    let config = AppConfig::from_args(app);
    let _log_guard = logging::init(&config.log_file, &config.log_level)
        .map_err(|error| io::Error::other(error.to_string()))?;

    let debug = DebugSession::new(debug_args);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let services = Services {
        api: PokeApi::new(config.endpoint.clone()),
        stats: Arc::from(stats::store_for(config.stats.clone())),
    };
    info!(
        endpoint = services.api.endpoint(),
        stats = services.stats.backend(),
        route = %config.route.to_query_string(),
        "starting pokedex"
    );

    let route = config.route.clone();
    let prefetch = config.prefetch;
    let api = services.api.clone();
    let backend_label = config.stats.label();
    let state = debug
        .load_state_or_else_async(move || async move {
            let initial_page = if prefetch {
                fetch_initial_page(&api, &route).await
            } else {
                None
            };
            let mut state = AppState::new(route, initial_page);
            state.stats_backend = backend_label.to_string();
            if let Ok(size) = crossterm::terminal::size() {
                state.terminal_size = size;
            }
            Ok::<AppState, io::Error>(state)
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions, services).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

/// The unfiltered first page, fetched before the first frame so the grid
/// starts populated. Filtered routes fetch their own first page on `Init`.
async fn fetch_initial_page(api: &PokeApi, route: &query::RouteQuery) -> Option<Page> {
    let mode = query::mode(
        route.name.as_deref().unwrap_or_default(),
        route.type_name.as_deref(),
    );
    if mode != QueryMode::All {
        return None;
    }
    match api.fetch_page(&QueryMode::All, 0, ITEMS_PER_PAGE).await {
        Ok(page) => Some(page),
        Err(error) => {
            warn!(%error, "initial page fetch failed, the list will retry on start");
            None
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    services: Services,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(PokedexUi::new()));
    let mut bus: EventBus<AppState, Action, PokedexComponentId, PokedexContext> = EventBus::new();
    let keybindings: Keybindings<PokedexContext> = Keybindings::new();

    let ui_search = Rc::clone(&ui);
    bus.register(PokedexComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    let ui_grid = Rc::clone(&ui);
    bus.register(PokedexComponentId::Grid, move |event, state| {
        ui_grid.borrow_mut().handle_grid_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(PokedexComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) if !state.search.active => match key.code {
            crossterm::event::KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            crossterm::event::KeyCode::Char('/') => HandlerResponse::action(Action::SearchStart),
            crossterm::event::KeyCode::Char('[') => {
                HandlerResponse::action(Action::TypeFilterPrev)
            }
            crossterm::event::KeyCode::Char(']') => {
                HandlerResponse::action(Action::TypeFilterNext)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(LOADING_ANIM_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, &services),
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, services: &Services) {
    match effect {
        Effect::FetchPage(request) => {
            let api = services.api.clone();
            ctx.tasks().spawn(TaskKey::new("page"), async move {
                match api
                    .fetch_page(&request.mode, request.offset, request.limit)
                    .await
                {
                    Ok(page) => Action::PageDidLoad { request, page },
                    Err(error) => {
                        warn!(%error, offset = request.offset, "page fetch failed");
                        Action::PageDidError {
                            request,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::DebounceSearch { query } => {
            ctx.tasks().debounce(
                "search_commit",
                Duration::from_millis(SEARCH_DEBOUNCE_MS),
                async move { Action::SearchCommit(query) },
            );
        }
        Effect::LoadPokemonDetail { name } => {
            let api = services.api.clone();
            ctx.tasks().spawn(TaskKey::new("detail"), async move {
                match api.fetch_detail(&name).await {
                    Ok(detail) => Action::PokemonDidLoad(detail),
                    Err(error) => {
                        warn!(%error, %name, "detail fetch failed");
                        Action::PokemonDidError {
                            name,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::RecordVisit { name } => {
            let store = Arc::clone(&services.stats);
            let key = format!("stats_record_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                if let Err(error) = store.record(&name).await {
                    warn!(%error, %name, "could not record visit");
                }
                load_stats(store.as_ref()).await
            });
        }
        Effect::LoadSearchStats => {
            let store = Arc::clone(&services.stats);
            ctx.tasks().spawn(TaskKey::new("stats_load"), async move {
                load_stats(store.as_ref()).await
            });
        }
        Effect::ClearSearchStats => {
            let store = Arc::clone(&services.stats);
            ctx.tasks().spawn(TaskKey::new("stats_clear"), async move {
                match store.clear().await {
                    Ok(()) => load_stats(store.as_ref()).await,
                    Err(error) => {
                        warn!(%error, "could not clear search stats");
                        Action::StatsDidError(error.to_string())
                    }
                }
            });
        }
        Effect::ScheduleRestoreAttempt => {
            ctx.tasks().spawn(TaskKey::new("restore"), async {
                tokio::time::sleep(Duration::from_millis(RESTORE_RETRY_MS)).await;
                Action::ListRestoreAttempt
            });
        }
    }
}

async fn load_stats(store: &dyn SearchStatsStore) -> Action {
    let popular = store.top(TRENDING_LIMIT).await;
    let recent = store.recent(RECENT_LIMIT).await;
    match (popular, recent) {
        (Ok(popular), Ok(recent)) => Action::StatsDidLoad { popular, recent },
        (Err(error), _) | (_, Err(error)) => {
            warn!(%error, "could not load search stats");
            Action::StatsDidError(error.to_string())
        }
    }
}
