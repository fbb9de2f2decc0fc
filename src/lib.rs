//! Pokedex - terminal table over the PokeAPI
//!
//! Fetches a page of Pokemon (list request plus one detail request per row),
//! shows it as a table with client-side name search and multi-select type
//! filtering, and opens a stats overlay for the selected row.
//!
//! ## Layout
//!
//! - [`source`]: PokeAPI access behind the `PokeSource` trait, page fan-out,
//!   and the background fetch task
//! - [`filter`], [`stats`], [`pagination`]: pure view logic
//! - [`app`]: view state driven by key input and fetch events
//! - [`ui`]: ratatui rendering
//!
//! The terminal binary lives in `src/bin/pokedex.rs`:
//! ```bash
//! cargo run --release -- --per-page 20 --types fire,water
//! ```

pub mod config;
pub mod types;

pub mod filter;
pub mod pagination;
pub mod stats;

pub mod net;
pub mod source;

pub mod theme;

pub mod app;
pub mod ui;

// Re-export commonly used types
pub use app::{App, InputMode};
pub use config::Config;
pub use types::{AppEvent, PageRequest, Pokemon, Stat, TypeOption};
