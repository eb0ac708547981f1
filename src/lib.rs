//! Pokedex TUI - searchable, infinitely scrolling Pokemon grid
//!
//! The library exposes the app's modules so the reducer, the paging
//! machinery and the renderer can be exercised from `tests/`.

pub mod action;
pub mod api;
pub mod config;
pub mod effect;
pub mod grid;
pub mod logging;
pub mod pagination;
pub mod query;
pub mod reducer;
pub mod restore;
pub mod sentinel;
pub mod state;
pub mod stats;
pub mod ui;
