//! Renderer-agnostic description of one frame.

use cgmath::{Matrix4, Vector3};

use crate::simulation::geometry::RodTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit-radius sphere.
    Sphere,
    /// Unit-radius, unit-height cylinder along +Y, centred on the origin.
    Cylinder,
    /// Unit square in the XZ plane facing +Y.
    Plane,
}

impl MeshKind {
    pub const ALL: [MeshKind; 3] = [MeshKind::Sphere, MeshKind::Cylinder, MeshKind::Plane];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub kind: MeshKind,
    pub model: Matrix4<f32>,
    pub color: [f32; 4],
    /// 0 for plain lit surfaces, up to 1 for fully self-lit.
    pub emissive: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStrip {
    pub points: Vec<Vector3<f32>>,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub meshes: Vec<MeshInstance>,
    pub lines: Vec<LineStrip>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
        self.lines.clear();
    }

    pub fn push_sphere(&mut self, center: Vector3<f32>, radius: f32, color: [f32; 4], emissive: f32) {
        self.meshes.push(MeshInstance {
            kind: MeshKind::Sphere,
            model: Matrix4::from_translation(center) * Matrix4::from_scale(radius),
            color,
            emissive,
        });
    }

    pub fn push_rod(&mut self, rod: &RodTransform, radius: f32, color: [f32; 4]) {
        self.meshes.push(MeshInstance {
            kind: MeshKind::Cylinder,
            model: rod.model_matrix(radius),
            color,
            emissive: 0.0,
        });
    }

    pub fn push_plane(&mut self, center: Vector3<f32>, size: f32, color: [f32; 4]) {
        self.meshes.push(MeshInstance {
            kind: MeshKind::Plane,
            model: Matrix4::from_translation(center) * Matrix4::from_nonuniform_scale(size, 1.0, size),
            color,
            emissive: 0.0,
        });
    }

    /// Adds a polyline; strips with fewer than two points are dropped.
    pub fn push_line<I>(&mut self, points: I, color: [f32; 4])
    where
        I: IntoIterator<Item = Vector3<f32>>,
    {
        let points: Vec<Vector3<f32>> = points.into_iter().collect();
        if points.len() >= 2 {
            self.lines.push(LineStrip { points, color });
        }
    }

    pub fn count(&self, kind: MeshKind) -> usize {
        self.meshes.iter().filter(|mesh| mesh.kind == kind).count()
    }
}
