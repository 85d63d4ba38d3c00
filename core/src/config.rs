use serde::{Deserialize, Serialize};

use crate::*;

/// How a session decides that the player has won.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinPolicy {
    /// Every non-mine cell has been opened, flags are irrelevant.
    OpenedSafeCells,
    /// Every cell is opened or flagged and the flag count equals the mine count.
    ExactFlags,
}

impl Default for WinPolicy {
    fn default() -> Self {
        Self::OpenedSafeCells
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub columns: Coord,
    pub mines: CellCount,
    #[serde(default)]
    pub win_policy: WinPolicy,
}

impl GameConfig {
    pub const fn new(rows: Coord, columns: Coord, mines: CellCount) -> Self {
        Self {
            rows,
            columns,
            mines,
            win_policy: WinPolicy::OpenedSafeCells,
        }
    }

    pub const fn with_win_policy(mut self, win_policy: WinPolicy) -> Self {
        self.win_policy = win_policy;
        self
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.columns)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.columns)
    }

    /// Checks the structural bounds the engine relies on: non-empty dimensions and
    /// `0 < mines < rows * columns`.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(GameError::InvalidConfig("field needs at least one row and column"));
        }
        if self.mines == 0 {
            return Err(GameError::InvalidConfig("field needs at least one mine"));
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines {
                mines: self.mines,
                cells: self.total_cells(),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Limits::DEFAULT.default_config()
    }
}

/// Defaults and bounds for user-chosen field settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub default_rows: Coord,
    pub default_columns: Coord,
    pub default_mines: CellCount,
    pub min_rows: Coord,
    pub max_rows: Coord,
    pub min_columns: Coord,
    pub max_columns: Coord,
    pub min_mines: CellCount,
}

impl Limits {
    pub const DEFAULT: Limits = Limits {
        default_rows: 9,
        default_columns: 9,
        default_mines: 10,
        min_rows: 9,
        max_rows: 20,
        min_columns: 9,
        max_columns: 20,
        min_mines: 2,
    };

    pub const fn default_config(&self) -> GameConfig {
        GameConfig::new(self.default_rows, self.default_columns, self.default_mines)
    }

    /// Upper mine bound for the given dimensions, half the cells rounded half up.
    pub const fn max_mines(rows: Coord, columns: Coord) -> CellCount {
        mult(rows, columns).div_ceil(2)
    }

    /// Turns raw user input into a playable config. Missing values fall back to the
    /// defaults, and everything is clamped into bounds, with the mine bound derived from the
    /// already clamped dimensions.
    pub fn sanitize(&self, rows: Option<u32>, columns: Option<u32>, mines: Option<u32>) -> GameConfig {
        let rows = clamp_coord(rows.unwrap_or(self.default_rows.into()), self.min_rows, self.max_rows);
        let columns = clamp_coord(
            columns.unwrap_or(self.default_columns.into()),
            self.min_columns,
            self.max_columns,
        );

        let max_mines = Self::max_mines(rows, columns).max(self.min_mines);
        let mines = mines
            .unwrap_or(self.default_mines.into())
            .clamp(self.min_mines.into(), max_mines.into());
        let mines = CellCount::try_from(mines).unwrap_or(max_mines);

        log::debug!("sanitized config: {}x{} with {} mines", rows, columns, mines);
        GameConfig::new(rows, columns, mines)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn clamp_coord(value: u32, min: Coord, max: Coord) -> Coord {
    let clamped = value.clamp(min.into(), max.into());
    Coord::try_from(clamped).unwrap_or(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_beginner() {
        let config = GameConfig::default();

        assert_eq!(config, GameConfig::new(9, 9, 10));
        assert_eq!(config.win_policy, WinPolicy::OpenedSafeCells);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_configs() {
        assert!(matches!(
            GameConfig::new(0, 9, 1).validate(),
            Err(GameError::InvalidConfig(_))
        ));
        assert!(matches!(
            GameConfig::new(9, 9, 0).validate(),
            Err(GameError::InvalidConfig(_))
        ));
        assert_eq!(
            GameConfig::new(3, 3, 9).validate(),
            Err(GameError::TooManyMines { mines: 9, cells: 9 })
        );
        assert!(GameConfig::new(3, 3, 8).validate().is_ok());
    }

    #[test]
    fn max_mines_rounds_half_up() {
        assert_eq!(Limits::max_mines(9, 9), 41);
        assert_eq!(Limits::max_mines(10, 10), 50);
        assert_eq!(Limits::max_mines(20, 20), 200);
    }

    #[test]
    fn sanitize_fills_defaults() {
        let config = Limits::DEFAULT.sanitize(None, None, None);

        assert_eq!(config, GameConfig::new(9, 9, 10));
    }

    #[test]
    fn sanitize_clamps_dimensions_and_mines() {
        let limits = Limits::DEFAULT;

        assert_eq!(limits.sanitize(Some(3), Some(100), Some(1)), GameConfig::new(9, 20, 2));
        assert_eq!(limits.sanitize(Some(9), Some(9), Some(500)), GameConfig::new(9, 9, 41));
        assert_eq!(
            limits.sanitize(Some(u32::MAX), Some(15), Some(u32::MAX)),
            GameConfig::new(20, 15, 150)
        );
    }
}
