#![warn(missing_docs)]
//! Bar-chart layout: fixture records in, box placements out.

mod fixture;
mod grid;
mod layout;
mod palette;

pub use fixture::{Fixture, FixtureError, BUILTIN_FIXTURE};
pub use grid::{GridCell, GridShape, MAX_GRID_SIDE};
pub use layout::{map_default_grid, map_records, BoxSpec, CELL_SPACING, DEPTH, UNIT_SCALE};
pub use palette::{Palette, Rgb};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One fixture entry. `age` drives box height, `race` drives box width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Value mapped onto the vertical extent.
    pub age: f64,
    /// Value mapped onto the lateral extent.
    pub race: f64,
}

impl Record {
    /// Build a record from its two fields.
    pub const fn new(age: f64, race: f64) -> Self {
        Self { age, race }
    }
}

/// Errors emitted by the layout mapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The record sequence does not fill the grid exactly.
    #[error("expected {expected} records to fill the grid, got {actual}")]
    RecordCountMismatch {
        /// `columns * rows` of the requested grid.
        expected: usize,
        /// Number of records supplied.
        actual: usize,
    },
    /// The grid has more cells than can be laid out.
    #[error("grid of {columns}x{rows} cells is too large to lay out")]
    GridTooLarge {
        /// Requested column count.
        columns: usize,
        /// Requested row count.
        rows: usize,
    },
}
