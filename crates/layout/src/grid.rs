use serde::{Deserialize, Serialize};

/// Largest accepted column or row count.
pub const MAX_GRID_SIDE: usize = 1024;

/// Column/row dimensions of the bar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridShape {
    /// Number of columns (x axis). Each column gets its own palette colour.
    pub columns: usize,
    /// Number of rows (z axis).
    pub rows: usize,
}

impl Default for GridShape {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 6,
        }
    }
}

impl GridShape {
    /// Create a grid with the given dimensions.
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Number of cells, and therefore records, the grid holds. `None` when
    /// `columns * rows` overflows `usize`.
    pub fn cell_count(&self) -> Option<usize> {
        self.columns.checked_mul(self.rows)
    }

    /// Whether both sides are at most [`MAX_GRID_SIDE`].
    pub fn is_within_limits(&self) -> bool {
        self.columns <= MAX_GRID_SIDE && self.rows <= MAX_GRID_SIDE
    }

    /// Cells in record order: column outer, row inner.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> {
        let rows = self.rows;
        (0..self.columns).flat_map(move |column| (0..rows).map(move |row| GridCell { column, row }))
    }
}

/// A `(column, row)` coordinate in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Column index in `[0, columns)`.
    pub column: usize,
    /// Row index in `[0, rows)`.
    pub row: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_four_by_six() {
        let grid = GridShape::default();
        assert_eq!(grid.cell_count(), Some(24));
        assert!(grid.is_within_limits());
    }

    #[test]
    fn overflowing_cell_count_is_none() {
        let grid = GridShape::new(usize::MAX / 2 + 1, 2);
        assert_eq!(grid.cell_count(), None);
        assert!(!grid.is_within_limits());
        assert!(!GridShape::new(4, MAX_GRID_SIDE + 1).is_within_limits());
    }

    #[test]
    fn cells_are_column_major() {
        let grid = GridShape::new(2, 3);
        let cells: Vec<_> = grid.cells().map(|c| (c.column, c.row)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        for (k, cell) in grid.cells().enumerate() {
            assert_eq!(cell.column * grid.rows + cell.row, k);
        }
    }
}
