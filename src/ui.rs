use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::grid::{GridGeometry, ListChrome, CARD_HEIGHT, CARD_WIDTH};
use crate::query::TYPE_NAMES;
use crate::sentinel::SENTINEL_ROWS;
use crate::state::{capitalize, AppState, Pokemon, PokemonDetail, PokemonStat, Route};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PokedexComponentId {
    Search,
    Grid,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PokedexContext {
    Search,
    Grid,
    Detail,
}

impl EventRoutingState<PokedexComponentId, PokedexContext> for AppState {
    fn focused(&self) -> Option<PokedexComponentId> {
        if self.search.active {
            return Some(PokedexComponentId::Search);
        }
        match self.route {
            Route::List => Some(PokedexComponentId::Grid),
            Route::Detail(_) => Some(PokedexComponentId::Detail),
        }
    }

    fn modal(&self) -> Option<PokedexComponentId> {
        if self.search.active {
            Some(PokedexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: PokedexComponentId) -> PokedexContext {
        match id {
            PokedexComponentId::Search => PokedexContext::Search,
            PokedexComponentId::Grid => PokedexContext::Grid,
            PokedexComponentId::Detail => PokedexContext::Detail,
        }
    }

    fn default_context(&self) -> PokedexContext {
        PokedexContext::Grid
    }
}

/// Screen regions that receive events after a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewAreas {
    pub search: Option<Rect>,
    pub grid: Option<Rect>,
    pub detail: Option<Rect>,
}

pub struct PokedexUi {
    status_bar: StatusBar,
}

impl Default for PokedexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl PokedexUi {
    pub fn new() -> Self {
        Self {
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        let areas = self.render_view(frame, area, state);
        for (id, rect) in [
            (PokedexComponentId::Search, areas.search),
            (PokedexComponentId::Grid, areas.grid),
            (PokedexComponentId::Detail, areas.detail),
        ] {
            match rect {
                Some(rect) => event_ctx.set_component_area(id, rect),
                None => {
                    event_ctx.component_areas.remove(&id);
                }
            }
        }
    }

    /// Draws the whole screen for the current route.
    pub fn render_view(&mut self, frame: &mut Frame, area: Rect, state: &AppState) -> ViewAreas {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);

        let areas = match state.route {
            Route::List => render_list_route(frame, area, state),
            Route::Detail(_) => render_detail_route(frame, area, state),
        };
        let footer = Rect {
            y: area.y + area.height.saturating_sub(crate::grid::FOOTER_ROWS),
            height: crate::grid::FOOTER_ROWS.min(area.height),
            ..area
        };
        render_footer(frame, footer, state, &mut self.status_bar);
        areas
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handler_response(search_actions(event, state))
    }

    pub fn handle_grid_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handler_response(grid_actions(event, state))
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handler_response(detail_actions(event, state))
    }
}

fn search_actions(event: &EventKind, _state: &AppState) -> Vec<Action> {
    match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc | crossterm::event::KeyCode::Enter => {
                vec![Action::SearchEnd]
            }
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char('u')
                if key
                    .modifiers
                    .contains(crossterm::event::KeyModifiers::CONTROL) =>
            {
                vec![Action::SearchClear]
            }
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    }
}

fn grid_actions(event: &EventKind, state: &AppState) -> Vec<Action> {
    match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                vec![Action::ListMove(-1)]
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                vec![Action::ListMove(1)]
            }
            crossterm::event::KeyCode::Up | crossterm::event::KeyCode::Char('k') => {
                vec![Action::ListMoveRow(-1)]
            }
            crossterm::event::KeyCode::Down | crossterm::event::KeyCode::Char('j') => {
                vec![Action::ListMoveRow(1)]
            }
            crossterm::event::KeyCode::PageDown => vec![Action::ListPage(1)],
            crossterm::event::KeyCode::PageUp => vec![Action::ListPage(-1)],
            crossterm::event::KeyCode::Home | crossterm::event::KeyCode::Char('g') => {
                vec![Action::ListJumpTop]
            }
            crossterm::event::KeyCode::End | crossterm::event::KeyCode::Char('G') => {
                vec![Action::ListJumpBottom]
            }
            crossterm::event::KeyCode::Enter => vec![Action::ListOpen],
            crossterm::event::KeyCode::Char('r') => vec![Action::ListRetry],
            crossterm::event::KeyCode::Char('x') => vec![Action::SearchClear],
            crossterm::event::KeyCode::Char('c') => vec![Action::TypeFilterClear],
            crossterm::event::KeyCode::Char('f') => vec![Action::TypeFilterToggleRow],
            crossterm::event::KeyCode::Char('C') => vec![Action::StatsClear],
            crossterm::event::KeyCode::Char(digit @ '1'..='9') if state.trending_visible() => {
                let index = digit as usize - '1' as usize;
                vec![Action::SearchTrending(index)]
            }
            _ => vec![],
        },
        EventKind::Scroll { delta, .. } => vec![Action::ListScroll((*delta * 3) as i16)],
        _ => vec![],
    }
}

fn detail_actions(event: &EventKind, _state: &AppState) -> Vec<Action> {
    match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc
            | crossterm::event::KeyCode::Backspace
            | crossterm::event::KeyCode::Char('b') => vec![Action::DetailBack],
            crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                vec![Action::EvolutionMove(-1)]
            }
            crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                vec![Action::EvolutionMove(1)]
            }
            crossterm::event::KeyCode::Enter => vec![Action::EvolutionOpen],
            crossterm::event::KeyCode::Char('C') => vec![Action::StatsClear],
            _ => vec![],
        },
        _ => vec![],
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_list_route(frame: &mut Frame, area: Rect, state: &AppState) -> ViewAreas {
    let chrome = ListChrome::for_state(state);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(chrome.header),
            Constraint::Length(chrome.search),
            Constraint::Length(chrome.filters),
            Constraint::Length(chrome.trending),
            Constraint::Min(3),
            Constraint::Length(chrome.footer),
        ])
        .split(area);

    render_header(frame, layout[0], state);
    render_search(frame, layout[1], state);
    if chrome.filters > 0 {
        render_type_chips(frame, layout[2], state);
    }
    if chrome.trending > 0 {
        render_trending(frame, layout[3], state);
    }
    render_grid(frame, layout[4], state);

    ViewAreas {
        search: Some(layout[1]),
        grid: Some(layout[4]),
        detail: None,
    }
}

fn render_detail_route(frame: &mut Frame, area: Rect, state: &AppState) -> ViewAreas {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(crate::grid::HEADER_ROWS),
            Constraint::Min(6),
            Constraint::Length(crate::grid::FOOTER_ROWS),
        ])
        .split(area);

    render_header(frame, layout[0], state);
    render_detail(frame, layout[1], state);

    ViewAreas {
        search: None,
        grid: None,
        detail: Some(layout[1]),
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default()
        .fg(ACCENT_TEAL)
        .add_modifier(Modifier::BOLD);
    let path = match &state.route {
        Route::List => format!("/{}", state.route_query().to_query_string()),
        Route::Detail(name) => format!("/pokemon/{name}"),
    };
    let total = if state.pager.total_count > 0 {
        format!("Explore {} Pokémon", state.pager.total_count)
    } else {
        "Explore Pokémon".to_string()
    };
    let line = Line::from(vec![
        Span::styled(total, title_style),
        Span::raw("  |  "),
        Span::styled(path, Style::default().fg(ACCENT_GOLD)),
        Span::raw("  |  Stats: "),
        Span::styled(state.stats_backend.clone(), Style::default().fg(TEXT_DIM)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title("POKEDEX");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_search(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.search.active {
        Line::from(vec![
            Span::styled(
                format!("{}_", state.search.input),
                Style::default().fg(ACCENT_TEAL),
            ),
            pending_marker(state),
        ])
    } else if state.search.input.is_empty() {
        Line::from(Span::styled(
            "Search Pokémon by name...",
            Style::default().fg(TEXT_DIM),
        ))
    } else {
        Line::from(vec![
            Span::styled(state.search.input.clone(), Style::default().fg(TEXT_MAIN)),
            pending_marker(state),
        ])
    };
    let border = if state.search.active {
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(border)
        .title("SEARCH");
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Shown while the typed text has not been committed yet.
fn pending_marker(state: &AppState) -> Span<'static> {
    if state.search.input != state.search.committed {
        Span::styled("  …", Style::default().fg(TEXT_DIM))
    } else {
        Span::raw("")
    }
}

fn render_type_chips(frame: &mut Frame, area: Rect, state: &AppState) {
    let overridden = !state.search.committed.trim().is_empty();
    let mut spans = Vec::with_capacity(TYPE_NAMES.len() * 2 + 2);
    let all_selected = state.type_filter.is_none();
    spans.push(chip("All", all_selected, TEXT_MAIN, false));
    for name in TYPE_NAMES {
        spans.push(Span::raw(" "));
        let selected = state.type_filter.as_deref() == Some(name);
        spans.push(chip(name, selected, type_color(name), overridden));
    }
    let title = if overridden && state.type_filter.is_some() {
        "TYPE (search takes priority)"
    } else {
        "TYPE"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title(title);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn chip(label: &str, selected: bool, color: Color, dimmed: bool) -> Span<'static> {
    let style = if selected && !dimmed {
        Style::default()
            .fg(BG_BASE)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(color).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(color)
    };
    Span::styled(format!(" {label} "), style)
}

fn render_trending(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut trending = vec![Span::styled("Trending: ", Style::default().fg(ACCENT_GOLD))];
    for (index, stat) in state.popular.iter().enumerate() {
        if index > 0 {
            trending.push(Span::raw("  "));
        }
        trending.push(Span::styled(
            format!("{} ", index + 1),
            Style::default().fg(TEXT_DIM),
        ));
        trending.push(Span::styled(
            capitalize(&stat.query),
            Style::default().fg(TEXT_MAIN),
        ));
        trending.push(Span::styled(
            format!(" ×{}", stat.count),
            Style::default().fg(ACCENT_TEAL),
        ));
    }
    let recent = state
        .recent
        .iter()
        .map(|stat| capitalize(&stat.query))
        .collect::<Vec<_>>()
        .join(", ");
    let text = Text::from(vec![
        Line::from(trending),
        Line::from(vec![
            Span::styled("Recent: ", Style::default().fg(ACCENT_GOLD)),
            Span::styled(recent, Style::default().fg(TEXT_DIM)),
        ]),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title("POPULAR");
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let pager = &state.pager;
    let title = if pager.items.is_empty() {
        state.current_mode().label()
    } else {
        format!(
            "{} · {}/{}",
            state.current_mode().label(),
            pager.items.len(),
            pager.total_count
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(ACCENT_TEAL))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if pager.items.is_empty() {
        render_empty_grid(frame, inner, state);
        return;
    }

    let geometry = GridGeometry::new(inner.width, inner.height, pager.items.len());
    let scroll_y = geometry.clamp_scroll(state.scroll_y);
    let view_end = scroll_y + geometry.viewport_rows;

    for row in 0..geometry.item_rows() {
        let top = row * CARD_HEIGHT;
        if top < scroll_y {
            continue;
        }
        if top >= view_end {
            break;
        }
        let height = CARD_HEIGHT.min(view_end - top);
        if height < 3 {
            break;
        }
        for column in 0..geometry.columns {
            let index = row * geometry.columns + column;
            let Some(pokemon) = pager.items.get(index) else {
                break;
            };
            let rect = Rect {
                x: inner.x + column as u16 * CARD_WIDTH,
                y: inner.y + (top - scroll_y) as u16,
                width: CARD_WIDTH.min(inner.width),
                height: height as u16,
            };
            render_card(frame, rect, pokemon, index == state.selected);
        }
    }

    let sentinel_top = geometry.sentinel_top();
    if sentinel_top >= scroll_y && sentinel_top < view_end {
        let rect = Rect {
            x: inner.x,
            y: inner.y + (sentinel_top - scroll_y) as u16,
            width: inner.width,
            height: SENTINEL_ROWS.min(view_end - sentinel_top) as u16,
        };
        render_sentinel(frame, rect, state);
    }
}

fn render_card(frame: &mut Frame, area: Rect, pokemon: &Pokemon, selected: bool) {
    let accent = pokemon.primary_type().map(type_color).unwrap_or(TEXT_DIM);
    let (bg, border) = if selected {
        (BG_HIGHLIGHT, Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD))
    } else {
        (BG_PANEL, Style::default().fg(accent))
    };
    let types = pokemon
        .types
        .iter()
        .map(|name| Span::styled(format!("{name} "), Style::default().fg(type_color(name))))
        .collect::<Vec<_>>();
    let text = Text::from(vec![
        Line::from(Span::styled(
            pokemon.display_name(),
            Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
        )),
        Line::from(types),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(border)
        .title(format!("#{}", pokemon.number));
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_sentinel(frame: &mut Frame, area: Rect, state: &AppState) {
    let pager = &state.pager;
    let line = if pager.is_loading_more {
        Line::from(Span::styled(
            format!("{} Loading more Pokémon...", spinner(state)),
            Style::default().fg(ACCENT_TEAL),
        ))
    } else if !pager.has_more {
        Line::from(Span::styled(
            format!("All {} Pokémon loaded", pager.items.len()),
            Style::default().fg(TEXT_DIM),
        ))
    } else {
        Line::from(Span::styled("···", Style::default().fg(TEXT_DIM)))
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_empty_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.pager.is_loading_initial {
        render_skeleton(frame, area);
        return;
    }
    let text = if state.is_query_active() {
        Text::from(vec![
            Line::from(Span::styled(
                "No Pokémon found",
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Try a different name or type (x clears search, c clears type)",
                Style::default().fg(TEXT_DIM),
            )),
        ])
    } else {
        Text::from(Span::styled(
            "Nothing loaded yet. Press r to retry.",
            Style::default().fg(TEXT_DIM),
        ))
    };
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Placeholder cards while the first page is on its way.
fn render_skeleton(frame: &mut Frame, area: Rect) {
    let columns = GridGeometry::new(area.width, area.height, 0).columns;
    let rows = (area.height as usize / CARD_HEIGHT).min(3);
    for row in 0..rows {
        for column in 0..columns {
            let rect = Rect {
                x: area.x + column as u16 * CARD_WIDTH,
                y: area.y + (row * CARD_HEIGHT) as u16,
                width: CARD_WIDTH.min(area.width),
                height: CARD_HEIGHT as u16,
            };
            let skeleton = Paragraph::new("░░░░░░░░░░\n░░░░░░").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(TEXT_DIM)),
            );
            frame.render_widget(skeleton, rect);
        }
    }
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let name = state.detail_name().unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(ACCENT_TEAL))
        .title(capitalize(name));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.detail.is_loading() {
        let loading = Paragraph::new(format!("{} Loading {}...", spinner(state), capitalize(name)))
            .alignment(Alignment::Center)
            .style(Style::default().fg(ACCENT_TEAL));
        frame.render_widget(loading, inner);
        return;
    }
    if let Some(error) = state.detail.error() {
        let text = Text::from(vec![
            Line::from(Span::styled(
                "Pokémon not found",
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(error.to_string(), Style::default().fg(TEXT_DIM))),
            Line::from(Span::styled("Esc to go back", Style::default().fg(TEXT_DIM))),
        ]);
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }
    let Some(detail) = state.detail.data() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(inner);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    frame.render_widget(
        Paragraph::new(profile_text(detail))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(TEXT_MAIN)),
        columns[0],
    );
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .title("STATS")
        .style(Style::default().fg(TEXT_MAIN));
    let stats = detail
        .stats
        .iter()
        .map(|stat| Line::from(render_stat(stat)))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(stats).block(stats_block), columns[1]);

    render_evolutions(frame, rows[1], state, detail);
}

fn profile_text(detail: &PokemonDetail) -> Text<'static> {
    let label = Style::default().fg(TEXT_DIM);
    let mut types = vec![Span::styled("Type: ", label)];
    for name in &detail.types {
        types.push(Span::styled(
            format!("{name} "),
            Style::default().fg(type_color(name)).add_modifier(Modifier::BOLD),
        ));
    }
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("#{} ", detail.number),
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::styled(
                capitalize(&detail.name),
                Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(types),
        Line::from(vec![
            Span::styled("Height: ", label),
            Span::raw(format!("{:.1} m", f32::from(detail.height) / 10.0)),
            Span::styled("  Weight: ", label),
            Span::raw(format!("{:.1} kg", f32::from(detail.weight) / 10.0)),
        ]),
        Line::from(vec![
            Span::styled("Base exp: ", label),
            Span::raw(
                detail
                    .base_experience
                    .map(|exp| exp.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
        Line::from(vec![
            Span::styled("Abilities: ", label),
            Span::raw(
                detail
                    .abilities
                    .iter()
                    .map(|name| capitalize(name))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        ]),
        Line::from(""),
    ];
    if let Some(flavor) = &detail.flavor_text {
        lines.push(Line::from(Span::styled(
            flavor.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    Text::from(lines)
}

fn render_evolutions(frame: &mut Frame, area: Rect, state: &AppState, detail: &PokemonDetail) {
    let mut spans = Vec::new();
    for (index, stage) in detail.evolutions.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" → ", Style::default().fg(TEXT_DIM)));
        }
        let mut style = if stage.name == detail.name {
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_MAIN)
        };
        if index == state.evolution_selected {
            style = style.bg(BG_HIGHLIGHT);
        }
        spans.push(Span::styled(
            format!(" #{:03} {} ", stage.id, capitalize(&stage.name)),
            style,
        ));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            "Does not evolve",
            Style::default().fg(TEXT_DIM),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title("EVOLUTION")
        .style(Style::default().fg(TEXT_MAIN));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = if state.pager.is_loading_initial {
        format!("{} Loading Pokémon...", spinner(state))
    } else if state.pager.is_loading_more {
        format!("{} Loading more...", spinner(state))
    } else if state.restore.is_active() {
        "Restoring position...".to_string()
    } else {
        String::new()
    };
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter/Esc", "Done"),
            StatusBarHint::new("Bksp", "Delete"),
            StatusBarHint::new("Ctrl+U", "Clear"),
        ];
        return (left, Vec::new());
    }
    match state.route {
        Route::List => {
            let mut left = vec![
                StatusBarHint::new("←↑↓→", "Move"),
                StatusBarHint::new("Enter", "Open"),
                StatusBarHint::new("PgUp/PgDn", "Page"),
            ];
            if state.trending_visible() {
                left.push(StatusBarHint::new("1-9", "Trending"));
            }
            if state.pager.items.is_empty() && !state.pager.is_loading() {
                left.push(StatusBarHint::new("r", "Retry"));
            }
            let center = vec![
                StatusBarHint::new("/", "Search"),
                StatusBarHint::new("[ ]", "Type"),
                StatusBarHint::new("f", "Filters"),
                StatusBarHint::new("q", "Quit"),
            ];
            (left, center)
        }
        Route::Detail(_) => {
            let left = vec![
                StatusBarHint::new("Esc", "Back"),
                StatusBarHint::new("←→", "Evolution"),
                StatusBarHint::new("Enter", "Open"),
            ];
            let center = vec![
                StatusBarHint::new("C", "Clear stats"),
                StatusBarHint::new("q", "Quit"),
            ];
            (left, center)
        }
    }
}

fn spinner(state: &AppState) -> &'static str {
    SPINNER[state.tick_count as usize % SPINNER.len()]
}

fn render_stat(stat: &PokemonStat) -> String {
    let label = shorten_stat(&stat.name);
    let bar_len = (stat.value as usize / 10).clamp(1, 20);
    let bar = "█".repeat(bar_len);
    format!("{label:>4} {value:>3} {bar}", value = stat.value)
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => "HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SATK".to_string(),
        "special-defense" => "SDEF".to_string(),
        "speed" => "SPD".to_string(),
        _ => name.to_ascii_uppercase(),
    }
}

pub fn type_color(name: &str) -> Color {
    match name {
        "Grass" => Color::Rgb(16, 185, 129),
        "Poison" => Color::Rgb(168, 85, 247),
        "Fire" => Color::Rgb(239, 68, 68),
        "Water" => Color::Rgb(59, 130, 246),
        "Electric" => Color::Rgb(234, 179, 8),
        "Psychic" => Color::Rgb(236, 72, 153),
        "Ice" => Color::Rgb(6, 182, 212),
        "Dragon" => Color::Rgb(139, 92, 246),
        "Dark" => Color::Rgb(100, 116, 139),
        "Fairy" => Color::Rgb(244, 114, 182),
        "Fighting" => Color::Rgb(249, 115, 22),
        "Flying" => Color::Rgb(129, 140, 248),
        "Ground" => Color::Rgb(217, 119, 6),
        "Rock" => Color::Rgb(120, 113, 108),
        "Bug" => Color::Rgb(132, 204, 22),
        "Ghost" => Color::Rgb(124, 58, 237),
        "Steel" => Color::Rgb(148, 163, 184),
        "Normal" => Color::Rgb(107, 114, 128),
        _ => TEXT_DIM,
    }
}
