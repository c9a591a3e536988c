use barscape_layout::{GridShape, Rgb, CELL_SPACING};
use glam::Vec3;

use crate::{Marker, AXIS_ORIGIN};

/// Tick marker radius.
pub const MARKER_RADIUS: f32 = 0.1;
/// Tick marker colour.
pub const MARKER_COLOR: Rgb = Rgb(0xff0000);

/// Tick markers for `grid`: the axis origin, one per column along x, one per
/// row along z, and `vertical_ticks` unit steps up y.
pub fn axis_markers(grid: GridShape, vertical_ticks: u32) -> Vec<Marker> {
    let spacing = CELL_SPACING as f32;
    let mut positions = vec![AXIS_ORIGIN];
    for column in 0..grid.columns {
        positions.push(Vec3::new(column as f32 * spacing, 0.0, AXIS_ORIGIN.z));
    }
    for row in 0..grid.rows {
        positions.push(Vec3::new(AXIS_ORIGIN.x, 0.0, row as f32 * spacing));
    }
    for tick in 1..=vertical_ticks {
        positions.push(Vec3::new(AXIS_ORIGIN.x, tick as f32, AXIS_ORIGIN.z));
    }

    positions
        .into_iter()
        .map(|position| Marker {
            position,
            radius: MARKER_RADIUS,
            color: MARKER_COLOR,
        })
        .collect()
}
