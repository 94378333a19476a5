// Unit mesh geometry

use super::{MeshKind, Vertex};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// CPU-side geometry for one unit mesh
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    /// Build the unit mesh for a kind
    pub fn for_kind(kind: MeshKind) -> Self {
        match kind {
            MeshKind::Sphere => Self::sphere(32, 16),
            MeshKind::Cube => Self::cube(),
            MeshKind::Plane => Self::plane(),
        }
    }

    /// UV sphere of radius 1
    pub fn sphere(segments: u16, rings: u16) -> Self {
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let normal = Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                );
                vertices.push(Vertex::new(normal, normal));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                // Counter-clockwise seen from outside
                indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
            }
        }

        Self { vertices, indices }
    }

    /// Cube with side length 1 centered at the origin, flat-shaded
    pub fn cube() -> Self {
        let faces = [
            (Vec3::X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::Z),
            (Vec3::NEG_Y, Vec3::Z),
            (Vec3::Z, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, up) in faces {
            let right = up.cross(normal);
            let center = normal * 0.5;
            let base = vertices.len() as u16;
            for (u, v) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                vertices.push(Vertex::new(center + right * u + up * v, normal));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    /// 1x1 quad in the XZ plane facing +Y
    pub fn plane() -> Self {
        let vertices = vec![
            Vertex::new(Vec3::new(-0.5, 0.0, 0.5), Vec3::Y),
            Vertex::new(Vec3::new(0.5, 0.0, 0.5), Vec3::Y),
            Vertex::new(Vec3::new(0.5, 0.0, -0.5), Vec3::Y),
            Vertex::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::Y),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Self { vertices, indices }
    }
}
