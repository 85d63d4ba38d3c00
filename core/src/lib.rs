//! Game-state engine for a single-player minesweeper.
//!
//! A [`Field`] holds the mine layout generated once per session. A [`GameEngine`] owns the
//! per-cell interaction state (opened, flagged, highlighted) and the overall [`GameState`],
//! and reports every change as a [`GameEvent`] through its [`Dispatcher`].

pub use cell::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use field::*;
pub use generator::*;
pub use results::*;
pub use timer::*;
pub use types::*;

mod cell;
mod config;
mod engine;
mod error;
mod events;
mod field;
mod generator;
mod results;
mod timer;
mod types;
