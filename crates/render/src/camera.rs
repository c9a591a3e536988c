//! Perspective camera aimed at a fixed target.

use barscape_scene::CameraRig;
use glam::{Mat4, Vec3};

/// Look-at camera with a perspective projection.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Aspect ratio (width/height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Camera {
    /// Build a camera from the scene's rig.
    pub fn from_rig(rig: &CameraRig, aspect: f32) -> Self {
        let mut camera = Self {
            position: rig.eye(),
            target: rig.look_at(),
            fov: rig.fov_radians(),
            aspect: 1.0,
            near: rig.near,
            far: rig.far,
        };
        camera.set_aspect(aspect);
        camera
    }

    /// Build the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Build the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Build combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update aspect ratio. Non-positive or non-finite values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Update aspect ratio from a surface size in pixels (call when window resizes).
    pub fn set_viewport(&mut self, size: (u32, u32)) {
        if size.1 > 0 {
            self.set_aspect(size.0 as f32 / size.1 as f32);
        }
    }
}
