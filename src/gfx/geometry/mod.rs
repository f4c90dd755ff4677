//! # Procedural Geometry
//!
//! Unit meshes for every [`MeshKind`] the scene can draw. Instances scale
//! and place them through their model matrix, so one mesh per kind is
//! uploaded once at start-up.
//!
//! - **Sphere**: UV sphere of radius 1
//! - **Cylinder**: radius 1, height 1 along +Y, centred on the origin
//! - **Plane**: 1 x 1 square in the XZ plane facing +Y

pub mod primitives;

pub use primitives::*;

use crate::gfx::rendering::vertex::Vertex3D;
use crate::scene::MeshKind;

/// Generated geometry ready for GPU upload.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices, counter-clockwise winding.
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions and normals into the renderer's vertex format.
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}

/// The unit mesh drawn for a mesh kind.
pub fn unit_mesh(kind: MeshKind) -> GeometryData {
    match kind {
        MeshKind::Sphere => generate_sphere(32, 16),
        MeshKind::Cylinder => generate_cylinder(1.0, 1.0, 16),
        MeshKind::Plane => generate_plane(1.0, 1.0, 1, 1),
    }
}
