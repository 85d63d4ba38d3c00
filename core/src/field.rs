use core::ops::Index;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Neighbours of a single cell, never more than eight.
pub type Neighbours = SmallVec<[Cell; 8]>;

/// Mine layout and per-cell type. Populated once by [`Field::generate`] (or built directly from
/// known mine positions) and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    grid: Array2<CellType>,
    mine_count: CellCount,
}

impl Field {
    /// Creates an unpopulated field with the dimensions and mine count of `config`.
    pub fn new(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid: Array2::default(config.size().to_nd_index()),
            mine_count: config.mines,
        })
    }

    /// Builds a field with mines at exactly the given positions, duplicates are ignored.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidConfig("field needs at least one row and column"));
        }

        let mut grid: Array2<CellType> = Array2::default(size.to_nd_index());
        for &(row, column) in mine_coords {
            if row >= size.0 || column >= size.1 {
                return Err(GameError::OutOfRange { row, column });
            }
            grid[(row, column).to_nd_index()] = CellType::Mine;
        }

        let mine_count = grid
            .iter()
            .filter(|cell| cell.is_mine())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        let mut field = Self { grid, mine_count };
        field.place_numbers();
        Ok(field)
    }

    /// Places the mines by rejection sampling, then derives the neighbour counts.
    ///
    /// Terminates because construction guarantees `mine_count < rows * columns`.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (rows, columns) = self.size();
        self.grid.fill(CellType::Empty);

        let mut placed: CellCount = 0;
        let mut draws: u32 = 0;
        while placed < self.mine_count {
            let coords = (rng.random_range(0..rows), rng.random_range(0..columns));
            draws += 1;
            if self[coords].is_mine() {
                continue;
            }
            self.grid[coords.to_nd_index()] = CellType::Mine;
            placed += 1;
        }
        log::debug!(
            "placed {} mines on {}x{} field in {} draws",
            placed,
            rows,
            columns,
            draws
        );

        self.place_numbers();
    }

    fn place_numbers(&mut self) {
        let size = self.size();
        let mines: Vec<Coord2> = self.mine_positions().collect();

        for mine in mines {
            for pos in NeighborIter::new(mine, size) {
                let cell = &mut self.grid[pos.to_nd_index()];
                *cell = cell.incremented();
            }
        }
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, columns) = self.size();
        if coords.0 < rows && coords.1 < columns {
            Ok(coords)
        } else {
            Err(GameError::OutOfRange {
                row: coords.0,
                column: coords.1,
            })
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.grid.dim();
        (
            dim.0.try_into().unwrap_or(Coord::MAX),
            dim.1.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn columns(&self) -> Coord {
        self.size().1
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, columns) = self.size();
        mult(rows, columns)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn cell_type(&self, coords: Coord2) -> Result<CellType> {
        let coords = self.validate_coords(coords)?;
        Ok(self[coords])
    }

    pub fn cell(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cell_unchecked(coords))
    }

    /// Edge-clipped neighbours of a cell in row-major order.
    pub fn neighbours(&self, coords: Coord2) -> Result<Neighbours> {
        let coords = self.validate_coords(coords)?;
        Ok(self
            .iter_neighbors(coords)
            .map(|pos| self.cell_unchecked(pos))
            .collect())
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// All cell coordinates in row-major order.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, columns) = self.size();
        (0..rows).flat_map(move |row| (0..columns).map(move |column| (row, column)))
    }

    pub fn mine_positions(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.iter_coords().filter(|&coords| self[coords].is_mine())
    }

    pub(crate) fn cell_unchecked(&self, coords: Coord2) -> Cell {
        Cell::new(coords, self[coords])
    }
}

impl Index<Coord2> for Field {
    type Output = CellType;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.grid[coords.to_nd_index()]
    }
}
