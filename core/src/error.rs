use thiserror::Error;

use crate::Coord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates ({row}, {column}) are outside the field")]
    OutOfRange { row: Coord, column: Coord },
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("Too many mines: {mines} requested for a field of {cells} cells")]
    TooManyMines { mines: u16, cells: u16 },
    #[error("No game has been started yet")]
    NotStarted,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Results storage failed: {0}")]
    Storage(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
