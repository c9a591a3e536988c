#![warn(missing_docs)]
//! Scene composition for the bar chart.
//!
//! [`SceneContext::build`] is the single setup step: it runs the layout mapper
//! once and assembles axes, markers, ground, lights and camera into an
//! immutable description the renderer reads every frame.

mod instances;
mod markers;
mod options;

pub use instances::{LineVertex, MeshInstance, MeshKind, Shading};
pub use markers::{axis_markers, MARKER_COLOR, MARKER_RADIUS};
pub use options::{CameraRig, SceneOptions};

use barscape_layout::{map_records, BoxSpec, LayoutError, Record, Rgb};
use glam::Vec3;
use tracing::info;

/// Clear colour behind the chart.
pub const BACKGROUND: Rgb = Rgb(0xffffff);
/// Point where the three axis lines meet.
pub const AXIS_ORIGIN: Vec3 = Vec3::new(-1.0, 0.0, -1.0);
/// Far ends of the x, y and z axis lines.
pub const AXIS_ENDS: [Vec3; 3] = [
    Vec3::new(10.0, 0.0, -1.0),
    Vec3::new(-1.0, 10.0, -1.0),
    Vec3::new(-1.0, 0.0, 15.0),
];

/// Omnidirectional light with linear falloff to zero at `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    /// Light colour.
    pub color: Rgb,
    /// Scalar multiplier on `color`.
    pub intensity: f32,
    /// Distance at which the contribution reaches zero.
    pub range: f32,
}

/// Straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Start point.
    pub start: Vec3,
    /// End point.
    pub end: Vec3,
    /// Line colour.
    pub color: Rgb,
}

/// Flat disk lying on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundDisk {
    /// Disk centre.
    pub center: Vec3,
    /// Disk radius.
    pub radius: f32,
    /// Number of rim segments.
    pub segments: u32,
    /// Fill colour.
    pub color: Rgb,
}

/// Small sphere marking a tick along an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Sphere centre.
    pub position: Vec3,
    /// Sphere radius.
    pub radius: f32,
    /// Fill colour.
    pub color: Rgb,
}

/// Immutable scene handed to the renderer.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub(crate) background: Rgb,
    pub(crate) boxes: Vec<BoxSpec>,
    pub(crate) axes: Vec<LineSegment>,
    pub(crate) markers: Vec<Marker>,
    pub(crate) ground: Option<GroundDisk>,
    pub(crate) lights: Vec<PointLight>,
    pub(crate) camera: CameraRig,
}

impl SceneContext {
    /// Lay out `records` and assemble the rest of the scene around them.
    pub fn build(records: &[Record], options: &SceneOptions) -> Result<Self, LayoutError> {
        let boxes = map_records(records, options.grid)?;

        let axes = AXIS_ENDS
            .iter()
            .map(|&end| LineSegment {
                start: AXIS_ORIGIN,
                end,
                color: options.axis_color,
            })
            .collect();

        let markers = if options.show_markers {
            axis_markers(options.grid, options.vertical_ticks)
        } else {
            Vec::new()
        };

        let ground = options.show_ground.then_some(GroundDisk {
            center: Vec3::new(3.0, 0.0, 3.0),
            radius: 10.0,
            segments: 64,
            color: Rgb(0xdee2e6),
        });

        let lights = [Vec3::new(25.0, 10.0, 25.0), Vec3::new(-25.0, 10.0, -25.0)]
            .into_iter()
            .map(|position| PointLight {
                position,
                color: Rgb(0xffffff),
                intensity: 1.0,
                range: 500.0,
            })
            .collect();

        let scene = Self {
            background: BACKGROUND,
            boxes,
            axes,
            markers,
            ground,
            lights,
            camera: options.camera.clone(),
        };

        info!(
            boxes = scene.boxes.len(),
            markers = scene.markers.len(),
            ground = scene.ground.is_some(),
            "scene assembled"
        );
        Ok(scene)
    }

    /// Clear colour.
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Bars in record order.
    pub fn boxes(&self) -> &[BoxSpec] {
        &self.boxes
    }

    /// Axis lines.
    pub fn axes(&self) -> &[LineSegment] {
        &self.axes
    }

    /// Axis tick markers (empty when disabled).
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Ground disk, if enabled.
    pub fn ground(&self) -> Option<&GroundDisk> {
        self.ground.as_ref()
    }

    /// Scene lights.
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Initial camera placement.
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        (0..24).map(|i| Record::new(40.0 + i as f64, 10.0)).collect()
    }

    #[test]
    fn default_scene_has_boxes_axes_and_lights() {
        let scene = SceneContext::build(&records(), &SceneOptions::default()).unwrap();
        assert_eq!(scene.boxes().len(), 24);
        assert_eq!(scene.axes().len(), 3);
        assert_eq!(scene.lights().len(), 2);
        assert_eq!(scene.background(), Rgb(0xffffff));
        assert!(scene.ground().is_none());
    }

    #[test]
    fn axes_share_origin_and_color() {
        let options = SceneOptions {
            axis_color: Rgb(0xff0000),
            ..SceneOptions::default()
        };
        let scene = SceneContext::build(&records(), &options).unwrap();
        for axis in scene.axes() {
            assert_eq!(axis.start, AXIS_ORIGIN);
            assert_eq!(axis.color, Rgb(0xff0000));
        }
        assert_eq!(scene.axes()[1].end, Vec3::new(-1.0, 10.0, -1.0));
    }

    #[test]
    fn ground_disk_is_opt_in() {
        let options = SceneOptions {
            show_ground: true,
            ..SceneOptions::default()
        };
        let scene = SceneContext::build(&records(), &options).unwrap();
        let ground = scene.ground().expect("ground enabled");
        assert_eq!(ground.center, Vec3::new(3.0, 0.0, 3.0));
        assert_eq!(ground.radius, 10.0);
        assert_eq!(ground.segments, 64);
    }

    #[test]
    fn markers_can_be_hidden() {
        let options = SceneOptions {
            show_markers: false,
            ..SceneOptions::default()
        };
        let scene = SceneContext::build(&records(), &options).unwrap();
        assert!(scene.markers().is_empty());
    }

    #[test]
    fn layout_errors_propagate() {
        let err = SceneContext::build(&records()[..23], &SceneOptions::default()).unwrap_err();
        assert_eq!(
            err,
            LayoutError::RecordCountMismatch {
                expected: 24,
                actual: 23
            }
        );
    }

    #[test]
    fn lights_mirror_each_other() {
        let scene = SceneContext::build(&records(), &SceneOptions::default()).unwrap();
        let lights = scene.lights();
        assert_eq!(lights[0].position, -lights[1].position * Vec3::new(1.0, -1.0, 1.0));
        assert!(lights.iter().all(|l| l.range == 500.0 && l.intensity == 1.0));
    }
}
