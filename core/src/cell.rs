use serde::{Deserialize, Serialize};

use crate::*;

/// Static content of a cell, fixed once the field is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Mine,
    /// Count of adjacent mines, always in `1..=8`.
    Number(u8),
}

impl CellType {
    pub const fn from_count(count: u8) -> Self {
        if count == 0 {
            Self::Empty
        } else {
            Self::Number(count)
        }
    }

    /// Classic integer encoding: `-1` for a mine, `0` for empty, otherwise the count.
    pub const fn value(self) -> i8 {
        match self {
            Self::Empty => 0,
            Self::Mine => -1,
            Self::Number(count) => count as i8,
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// Adjacent mine count, zero for empty and mine cells.
    pub const fn count(self) -> u8 {
        match self {
            Self::Number(count) => count,
            _ => 0,
        }
    }

    pub(crate) const fn incremented(self) -> Self {
        match self {
            Self::Empty => Self::Number(1),
            Self::Number(count) => Self::Number(count + 1),
            Self::Mine => Self::Mine,
        }
    }
}

impl Default for CellType {
    fn default() -> Self {
        Self::Empty
    }
}

/// A cell value as handed out to consumers; mutating it never affects the field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: Coord,
    pub column: Coord,
    pub kind: CellType,
}

impl Cell {
    pub const fn new((row, column): Coord2, kind: CellType) -> Self {
        Self { row, column, kind }
    }

    pub const fn coords(&self) -> Coord2 {
        (self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_walk_from_empty_to_numbers() {
        let cell = CellType::default().incremented().incremented();

        assert_eq!(cell, CellType::Number(2));
        assert_eq!(cell.value(), 2);
        assert_eq!(CellType::Mine.incremented(), CellType::Mine);
    }

    #[test]
    fn from_count_keeps_zero_empty() {
        assert_eq!(CellType::from_count(0), CellType::Empty);
        assert_eq!(CellType::from_count(3), CellType::Number(3));
        assert_eq!(CellType::Mine.value(), -1);
        assert_eq!(CellType::Mine.count(), 0);
    }
}
