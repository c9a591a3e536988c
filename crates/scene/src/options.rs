use barscape_layout::{GridShape, Rgb};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Knobs that distinguish scene variants.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneOptions {
    /// Grid the records are laid out on.
    pub grid: GridShape,
    /// Draw the ground disk under the chart.
    pub show_ground: bool,
    /// Draw tick markers along the axes.
    pub show_markers: bool,
    /// Number of tick markers up the vertical axis.
    pub vertical_ticks: u32,
    /// Colour of the axis lines.
    pub axis_color: Rgb,
    /// Camera placement.
    pub camera: CameraRig,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            grid: GridShape::default(),
            show_ground: false,
            show_markers: true,
            vertical_ticks: 7,
            axis_color: Rgb(0x000000),
            camera: CameraRig::default(),
        }
    }
}

/// Perspective camera placement, aimed at a fixed target.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraRig {
    /// Eye position.
    pub position: [f32; 3],
    /// Point the camera looks at.
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 10.0],
            target: [3.0, 0.0, 3.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraRig {
    /// Eye position as a vector.
    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Look-at target as a vector.
    pub fn look_at(&self) -> Vec3 {
        Vec3::from_array(self.target)
    }

    /// Vertical field of view in radians.
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}
