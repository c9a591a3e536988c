//! Flattening the scene into draw-ready instances.

use barscape_layout::{BoxSpec, Rgb};
use glam::{Mat4, Quat, Vec3};

use crate::SceneContext;

/// Sinks the ground disk just below y=0 so axis lines and markers draw on top.
const GROUND_OFFSET: f32 = -0.01;

/// Unit meshes the renderer keeps resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit cube centred on the origin.
    Cube,
    /// Unit-radius sphere centred on the origin.
    Sphere,
    /// Unit-radius disk in the XZ plane facing +Y.
    Disk,
}

/// How an instance responds to scene lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Diffuse-only lighting from the scene's point lights.
    Lambert,
    /// Flat colour, ignores lights.
    Unlit,
}

/// One mesh draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    /// Which unit mesh to draw.
    pub mesh: MeshKind,
    /// Model matrix applied to the unit mesh.
    pub transform: Mat4,
    /// Surface colour.
    pub color: Rgb,
    /// Lighting model.
    pub shading: Shading,
}

/// One end of a line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    /// World-space position.
    pub position: Vec3,
    /// Line colour.
    pub color: Rgb,
}

fn box_transform(spec: &BoxSpec) -> Mat4 {
    let width = spec.width as f32;
    let height = spec.height as f32;
    let depth = spec.depth as f32;
    // Boxes stand on the ground plane rather than straddling it.
    Mat4::from_scale_rotation_translation(
        Vec3::new(width, height, depth),
        Quat::IDENTITY,
        Vec3::new(spec.x as f32, height / 2.0, spec.z as f32),
    )
}

impl SceneContext {
    /// Every mesh draw in the scene: boxes, then markers, then ground.
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let boxes = self.boxes.iter().map(|spec| MeshInstance {
            mesh: MeshKind::Cube,
            transform: box_transform(spec),
            color: spec.color,
            shading: Shading::Lambert,
        });

        let markers = self.markers.iter().map(|marker| MeshInstance {
            mesh: MeshKind::Sphere,
            transform: Mat4::from_scale_rotation_translation(
                Vec3::splat(marker.radius),
                Quat::IDENTITY,
                marker.position,
            ),
            color: marker.color,
            shading: Shading::Unlit,
        });

        let ground = self.ground.iter().map(|disk| MeshInstance {
            mesh: MeshKind::Disk,
            transform: Mat4::from_scale_rotation_translation(
                Vec3::new(disk.radius, 1.0, disk.radius),
                Quat::IDENTITY,
                disk.center + Vec3::new(0.0, GROUND_OFFSET, 0.0),
            ),
            color: disk.color,
            shading: Shading::Unlit,
        });

        boxes.chain(markers).chain(ground).collect()
    }

    /// Axis lines as vertex pairs for a line-list draw.
    pub fn line_vertices(&self) -> Vec<LineVertex> {
        self.axes
            .iter()
            .flat_map(|axis| {
                [
                    LineVertex {
                        position: axis.start,
                        color: axis.color,
                    },
                    LineVertex {
                        position: axis.end,
                        color: axis.color,
                    },
                ]
            })
            .collect()
    }
}
