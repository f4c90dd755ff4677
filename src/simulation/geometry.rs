//! Derived display geometry: pendulum rods and motion trails.
//!
//! Everything here is computed from body positions for drawing only and is
//! never fed back into the physics engine.

use cgmath::{InnerSpace, Matrix4, One, Quaternion, Rotation, Vector3, Zero};
use std::collections::VecDeque;

/// Maximum number of points kept per trail.
pub const TRAIL_CAPACITY: usize = 300;

/// Placement of a unit +Y cylinder so that it spans two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RodTransform {
    pub length: f32,
    pub midpoint: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl RodTransform {
    pub fn between(start: Vector3<f32>, end: Vector3<f32>) -> Self {
        let segment = end - start;
        let length = segment.magnitude();
        let midpoint = start + segment * 0.5;

        let rotation = if length > f32::EPSILON {
            Quaternion::from_arc(Vector3::unit_y(), segment / length, Some(Vector3::unit_z()))
        } else {
            Quaternion::one()
        };

        Self {
            length,
            midpoint,
            rotation,
        }
    }

    /// Direction the canonical +Y axis ends up pointing in.
    pub fn direction(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    pub fn model_matrix(&self, radius: f32) -> Matrix4<f32> {
        Matrix4::from_translation(self.midpoint)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(radius, self.length, radius)
    }
}

impl Default for RodTransform {
    fn default() -> Self {
        Self {
            length: 0.0,
            midpoint: Vector3::zero(),
            rotation: Quaternion::one(),
        }
    }
}

/// Fixed-capacity FIFO of recent positions; the oldest point drops first.
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vector3<f32>>,
    capacity: usize,
}

impl Trail {
    pub fn new() -> Self {
        Self::with_capacity(TRAIL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, point: Vector3<f32>) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = Vector3<f32>> + '_ {
        self.points.iter().copied()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}
