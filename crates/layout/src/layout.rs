//! Record → box placement mapping.

use serde::Serialize;
use tracing::debug;

use crate::{GridCell, GridShape, LayoutError, Palette, Record, Rgb};

/// World units between neighbouring grid cells.
pub const CELL_SPACING: f64 = 2.0;
/// Divisor applied to record fields to get world-unit extents.
pub const UNIT_SCALE: f64 = 10.0;
/// Constant box depth (z extent).
pub const DEPTH: f64 = 1.0;

/// Placement and appearance of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSpec {
    /// Grid column the box occupies.
    pub column: usize,
    /// Grid row the box occupies.
    pub row: usize,
    /// Ground-plane x position (`column * CELL_SPACING`).
    pub x: f64,
    /// Ground-plane z position (`row * CELL_SPACING`).
    pub z: f64,
    /// Vertical extent (`age / UNIT_SCALE`).
    pub height: f64,
    /// Lateral extent (`race / UNIT_SCALE`).
    pub width: f64,
    /// Depth extent, always [`DEPTH`].
    pub depth: f64,
    /// Column colour.
    pub color: Rgb,
}

impl BoxSpec {
    fn from_record(cell: GridCell, record: &Record, color: Rgb) -> Self {
        Self {
            column: cell.column,
            row: cell.row,
            x: cell.column as f64 * CELL_SPACING,
            z: cell.row as f64 * CELL_SPACING,
            height: record.age / UNIT_SCALE,
            width: record.race / UNIT_SCALE,
            depth: DEPTH,
            color,
        }
    }
}

/// Map records onto `grid`, one box per cell.
///
/// Record `k` lands in column `k / rows`, row `k % rows`. The record count must
/// equal `grid.cell_count()`; shorter or longer inputs are rejected rather than
/// truncated or padded. Grids whose cell count overflows, or with a side
/// longer than [`crate::MAX_GRID_SIDE`], fail with [`LayoutError::GridTooLarge`].
pub fn map_records(records: &[Record], grid: GridShape) -> Result<Vec<BoxSpec>, LayoutError> {
    let expected = match grid.cell_count() {
        Some(count) if grid.is_within_limits() => count,
        _ => {
            return Err(LayoutError::GridTooLarge {
                columns: grid.columns,
                rows: grid.rows,
            });
        }
    };
    if records.len() != expected {
        return Err(LayoutError::RecordCountMismatch {
            expected,
            actual: records.len(),
        });
    }

    let palette = Palette::default();
    let boxes: Vec<BoxSpec> = grid
        .cells()
        .zip(records)
        .map(|(cell, record)| {
            BoxSpec::from_record(cell, record, palette.color_for_column(cell.column))
        })
        .collect();

    debug!(
        columns = grid.columns,
        rows = grid.rows,
        boxes = boxes.len(),
        "mapped records onto grid"
    );
    Ok(boxes)
}

/// [`map_records`] on the default 4×6 grid.
pub fn map_default_grid(records: &[Record]) -> Result<Vec<BoxSpec>, LayoutError> {
    map_records(records, GridShape::default())
}
