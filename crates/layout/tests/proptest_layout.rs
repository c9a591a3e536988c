//! Property-based tests for the layout mapper
//!
//! Validates placement invariants on the default 4×6 grid:
//! - Output length equals input length
//! - Positions follow column-major cell order
//! - Colours come from the column palette
//! - Extents are the record fields divided by the unit scale
//! - Mapping is pure

use barscape_layout::{map_default_grid, map_records, GridShape, LayoutError, Palette, Record};
use proptest::prelude::*;

const ROWS: usize = 6;

fn record() -> impl Strategy<Value = Record> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(age, race)| Record::new(age, race))
}

proptest! {
    /// Property: a full grid of records yields exactly one box per record.
    #[test]
    fn full_grid_yields_one_box_per_record(records in prop::collection::vec(record(), 24)) {
        let boxes = map_default_grid(&records).unwrap();
        prop_assert_eq!(boxes.len(), 24);
    }

    /// Property: box `k` sits at `(k / rows * 2, k % rows * 2)` with its column colour.
    #[test]
    fn placement_follows_cell_order(records in prop::collection::vec(record(), 24)) {
        let palette = Palette::default();
        let boxes = map_default_grid(&records).unwrap();
        for (k, spec) in boxes.iter().enumerate() {
            prop_assert_eq!(spec.x, ((k / ROWS) * 2) as f64);
            prop_assert_eq!(spec.z, ((k % ROWS) * 2) as f64);
            prop_assert_eq!(spec.color, palette.color_for_column(k / ROWS));
            prop_assert_eq!(spec.depth, 1.0);
        }
    }

    /// Property: extents are exact divisions of the record fields.
    #[test]
    fn extents_scale_record_fields(records in prop::collection::vec(record(), 24)) {
        let boxes = map_default_grid(&records).unwrap();
        for (spec, record) in boxes.iter().zip(&records) {
            prop_assert_eq!(spec.height, record.age / 10.0);
            prop_assert_eq!(spec.width, record.race / 10.0);
        }
    }

    /// Property: mapping the same input twice gives identical output.
    #[test]
    fn mapping_is_idempotent(records in prop::collection::vec(record(), 24)) {
        let first = map_default_grid(&records).unwrap();
        let second = map_default_grid(&records).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: any length other than `columns * rows` is rejected.
    #[test]
    fn wrong_length_is_rejected(
        columns in 0usize..6,
        rows in 0usize..8,
        len in 0usize..60,
    ) {
        let grid = GridShape::new(columns, rows);
        let expected = grid.cell_count().unwrap();
        prop_assume!(len != expected);
        let records = vec![Record::new(1.0, 1.0); len];
        prop_assert_eq!(
            map_records(&records, grid),
            Err(LayoutError::RecordCountMismatch { expected, actual: len })
        );
    }
}
