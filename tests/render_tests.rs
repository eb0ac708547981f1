//! Render tests using RenderHarness and EffectStoreTestHarness

use tui_dispatch::testing::*;
use tui_dispatch::{DataResource, NumericComponentId};
use pokedex::{
    action::Action,
    pagination::Page,
    query::RouteQuery,
    reducer::reducer,
    state::{AppState, EvolutionStage, Pokemon, PokemonDetail, PokemonStat, Route, SearchStat},
    ui::PokedexUi,
};

fn starters() -> Page {
    let names = [
        (1, "bulbasaur", "Grass"),
        (4, "charmander", "Fire"),
        (7, "squirtle", "Water"),
        (25, "pikachu", "Electric"),
    ];
    Page {
        items: names
            .iter()
            .map(|(id, name, kind)| Pokemon::new(*id, name.to_string(), vec![kind.to_string()], None))
            .collect(),
        total_count: 1025,
    }
}

fn ivysaur() -> PokemonDetail {
    let stage = |id: u32, name: &str| EvolutionStage {
        id,
        name: name.into(),
        image: String::new(),
    };
    PokemonDetail {
        id: 2,
        name: "ivysaur".into(),
        number: "002".into(),
        height: 10,
        weight: 130,
        base_experience: Some(142),
        types: vec!["Grass".into(), "Poison".into()],
        stats: vec![
            PokemonStat {
                name: "hp".into(),
                value: 60,
            },
            PokemonStat {
                name: "special-attack".into(),
                value: 80,
            },
        ],
        abilities: vec!["overgrow".into()],
        image: String::new(),
        flavor_text: Some("When the bulb on its back grows large, it appears to lose the ability to stand on its hind legs.".into()),
        evolutions: vec![stage(1, "bulbasaur"), stage(2, "ivysaur"), stage(3, "venusaur")],
    }
}

fn render(state: &AppState) -> String {
    let mut render = RenderHarness::new(100, 40);
    let mut ui = PokedexUi::new();
    render.render_to_string_plain(|frame| {
        let area = frame.area();
        ui.render_view(frame, area, state);
    })
}

#[test]
fn test_render_cards() {
    let state = AppState::new(RouteQuery::default(), Some(starters()));
    let output = render(&state);

    for name in ["Bulbasaur", "Charmander", "Squirtle", "Pikachu"] {
        assert!(output.contains(name), "{name} card missing:\n{output}");
    }
    assert!(output.contains("#025"), "card number missing:\n{output}");
    assert!(output.contains("Explore 1025 Pokémon"));
}

#[test]
fn test_render_empty_filtered_list() {
    let mut harness = EffectStoreTestHarness::new(
        AppState::new(RouteQuery::new("zzz", None), None),
        reducer,
    );
    harness.dispatch_collect(Action::Init);
    let request = harness
        .drain_effects()
        .into_iter()
        .find_map(|effect| match effect {
            pokedex::effect::Effect::FetchPage(request) => Some(request),
            _ => None,
        })
        .expect("first page request");
    harness.complete_action(Action::PageDidLoad {
        request,
        page: Page::default(),
    });
    harness.process_emitted();

    let mut ui = PokedexUi::new();
    let output = harness.render_plain(100, 40, |frame, area, state| {
        ui.render_view(frame, area, state);
    });
    assert!(output.contains("No Pokémon found"), "{output}");
    assert!(output.contains("?name=zzz"), "route missing:\n{output}");
}

#[test]
fn test_render_failed_first_page_offers_retry() {
    let mut harness = EffectStoreTestHarness::new(AppState::new(RouteQuery::default(), None), reducer);
    harness.dispatch_collect(Action::Init);
    let request = harness
        .drain_effects()
        .into_iter()
        .find_map(|effect| match effect {
            pokedex::effect::Effect::FetchPage(request) => Some(request),
            _ => None,
        })
        .expect("first page request");
    harness.complete_action(Action::PageDidError {
        request,
        error: "offline".into(),
    });
    harness.process_emitted();

    let mut ui = PokedexUi::new();
    let output = harness.render_plain(100, 40, |frame, area, state| {
        ui.render_view(frame, area, state);
    });
    assert!(output.contains("Press r to retry"), "{output}");

    let actions = harness.send_keys::<NumericComponentId, _, _>("r", |state, event| {
        ui.handle_grid_event(&event.kind, state).actions
    });
    actions.assert_first(Action::ListRetry);
}

#[test]
fn test_render_end_of_list() {
    let mut page = starters();
    page.total_count = page.items.len();
    let state = AppState::new(RouteQuery::default(), Some(page));

    let output = render(&state);
    assert!(output.contains("All 4 Pokémon loaded"), "{output}");
}

#[test]
fn test_render_trending_row() {
    let mut state = AppState::new(RouteQuery::default(), Some(starters()));
    state.popular = vec![SearchStat {
        query: "mewtwo".into(),
        count: 7,
        last_searched: 1,
    }];

    let output = render(&state);
    assert!(output.contains("Trending"), "{output}");
    assert!(output.contains("Mewtwo"), "{output}");

    state.search.committed = "mew".into();
    let output = render(&state);
    assert!(!output.contains("Trending"), "hidden while filtering:\n{output}");
}

#[test]
fn test_render_detail() {
    let mut state = AppState::default();
    state.route = Route::Detail("ivysaur".into());
    state.detail = DataResource::Loaded(ivysaur());
    state.evolution_selected = 1;

    let output = render(&state);
    assert!(output.contains("Ivysaur"), "{output}");
    assert!(output.contains("Venusaur"), "{output}");
    assert!(output.contains("1.0 m"), "{output}");
    assert!(output.contains("SATK  80"), "{output}");
    assert!(output.contains("/pokemon/ivysaur"), "{output}");
}

#[test]
fn test_render_detail_not_found() {
    let mut state = AppState::default();
    state.route = Route::Detail("missingno".into());
    state.detail = DataResource::Failed("Pokemon missingno not found".into());

    let output = render(&state);
    assert!(output.contains("Pokémon not found"), "{output}");
}

#[test]
fn test_grid_keys_map_to_actions() {
    let mut harness = EffectStoreTestHarness::new(
        AppState::new(RouteQuery::default(), Some(starters())),
        reducer,
    );
    let mut ui = PokedexUi::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("l j enter", |state, event| {
        ui.handle_grid_event(&event.kind, state).actions
    });
    actions.assert_count(3);
    actions.assert_first(Action::ListMove(1));
    assert_eq!(actions[1], Action::ListMoveRow(1));
    assert_eq!(actions[2], Action::ListOpen);
}

#[test]
fn test_search_keys_map_to_actions() {
    let mut state = AppState::default();
    state.search.active = true;
    let mut harness = EffectStoreTestHarness::new(state, reducer);
    let mut ui = PokedexUi::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("a backspace esc", |state, event| {
        ui.handle_search_event(&event.kind, state).actions
    });
    assert_eq!(
        actions,
        vec![
            Action::SearchInput('a'),
            Action::SearchBackspace,
            Action::SearchEnd
        ]
    );
}
