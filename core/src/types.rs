/// Single coordinate axis used for field rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, column)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

// Row-major order around the center.
const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, column) = coords;
    let (d_row, d_column) = delta;
    let (rows, columns) = bounds;

    let next_row = row.checked_add_signed(d_row.try_into().ok()?)?;
    if next_row >= rows {
        return None;
    }

    let next_column = column.checked_add_signed(d_column.try_into().ok()?)?;
    if next_column >= columns {
        return None;
    }

    Some((next_row, next_column))
}

/// Iterates the edge-clipped 3x3 window around a cell, excluding the cell itself.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_counts_depend_on_position() {
        let bounds = (9, 9);

        assert_eq!(NeighborIter::new((0, 0), bounds).count(), 3);
        assert_eq!(NeighborIter::new((8, 8), bounds).count(), 3);
        assert_eq!(NeighborIter::new((0, 4), bounds).count(), 5);
        assert_eq!(NeighborIter::new((4, 0), bounds).count(), 5);
        assert_eq!(NeighborIter::new((4, 4), bounds).count(), 8);
    }

    #[test]
    fn neighbors_are_row_major() {
        let neighbors: Vec<_> = NeighborIter::new((1, 1), (3, 3)).collect();

        assert_eq!(
            neighbors,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
    }

    #[test]
    fn neighbors_clip_at_far_edge() {
        let neighbors: Vec<_> = NeighborIter::new((2, 4), (3, 5)).collect();

        assert_eq!(neighbors, vec![(1, 3), (1, 4), (2, 3)]);
    }
}
