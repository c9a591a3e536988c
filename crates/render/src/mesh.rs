//! Procedural unit meshes: cube, disk and sphere.

use glam::Vec3;

/// Vertex layout shared by every scene mesh.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space unit normal.
    pub normal: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// CPU-side indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    /// Vertex data.
    pub vertices: Vec<MeshVertex>,
    /// Triangle-list indices into `vertices`.
    pub indices: Vec<u32>,
}

/// Axis-aligned cube with unit extents, centred on the origin.
///
/// Each face has its own four vertices so normals stay flat.
pub fn unit_cube() -> MeshBuffers {
    // (normal, u, v) with u × v = normal so faces wind counter-clockwise from outside.
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = MeshBuffers::default();
    for (normal, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        let center = normal * 0.5;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            mesh.vertices.push(MeshVertex::new(center + u * su + v * sv, normal));
        }
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Unit-radius disk in the XZ plane facing +Y: a centre vertex plus
/// `segments + 1` rim vertices (first and last coincide).
pub fn unit_disk(segments: u32) -> MeshBuffers {
    let segments = segments.max(3);
    let mut mesh = MeshBuffers::default();
    mesh.vertices.push(MeshVertex::new(Vec3::ZERO, Vec3::Y));
    for i in 0..=segments {
        let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        mesh.vertices.push(MeshVertex::new(Vec3::new(cos, 0.0, sin), Vec3::Y));
    }
    for i in 1..=segments {
        mesh.indices.extend_from_slice(&[0, i + 1, i]);
    }
    mesh
}

/// Unit-radius UV sphere.
pub fn unit_sphere(slices: u32, stacks: u32) -> MeshBuffers {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let mut mesh = MeshBuffers::default();

    for stack in 0..=stacks {
        let polar = stack as f32 / stacks as f32 * std::f32::consts::PI;
        let (ring, y) = polar.sin_cos();
        for slice in 0..=slices {
            let azimuth = slice as f32 / slices as f32 * std::f32::consts::TAU;
            let (sin, cos) = azimuth.sin_cos();
            let point = Vec3::new(ring * cos, y, ring * sin);
            mesh.vertices.push(MeshVertex::new(point, point));
        }
    }

    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(mesh: &MeshBuffers, index: u32) -> Vec3 {
        Vec3::from_array(mesh.vertices[index as usize].position)
    }

    #[test]
    fn cube_has_six_flat_faces() {
        let cube = unit_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for vertex in &cube.vertices {
            let p = Vec3::from_array(vertex.position);
            let n = Vec3::from_array(vertex.normal);
            assert!((p.dot(n) - 0.5).abs() < 1e-6, "normal should point outward");
            assert!(p.abs().max_element() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn cube_triangles_wind_outward() {
        let cube = unit_cube();
        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| position(&cube, i));
            let face_normal = (b - a).cross(c - a);
            let expected = Vec3::from_array(cube.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(expected) > 0.0);
        }
    }

    #[test]
    fn disk_is_flat_and_faces_up() {
        let disk = unit_disk(64);
        assert_eq!(disk.vertices.len(), 66);
        assert_eq!(disk.indices.len(), 64 * 3);
        for vertex in &disk.vertices {
            let p = Vec3::from_array(vertex.position);
            assert_eq!(p.y, 0.0);
            assert!(p.length() <= 1.0 + 1e-5);
        }
        for tri in disk.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| position(&disk, i));
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let sphere = unit_sphere(16, 12);
        assert_eq!(sphere.vertices.len(), 17 * 13);
        assert_eq!(sphere.indices.len(), (16 * 12 * 6) as usize);
        for vertex in &sphere.vertices {
            assert!((Vec3::from_array(vertex.position).length() - 1.0).abs() < 1e-5);
        }
        let max_index = *sphere.indices.iter().max().unwrap();
        assert!((max_index as usize) < sphere.vertices.len());
    }
}
