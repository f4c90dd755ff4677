//! Physics engine boundary
//!
//! The rest of the crate talks to the rigid-body engine only through
//! [`PhysicsBackend`]. Handles are opaque; a handle that no longer resolves
//! is treated as "not ready" by every caller, never as an error.

pub mod rapier_world;
pub mod registry;

#[cfg(test)]
pub mod mock;

use cgmath::Vector3;

use crate::state::ObjectId;

pub use rapier_world::RapierWorld;
pub use registry::BodyHandleRegistry;

/// Opaque reference to a live body inside a [`PhysicsBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u64);

/// Opaque reference to a joint inside a [`PhysicsBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(pub(crate) u64);

/// Logical name of a body, used as the registry key.
///
/// User particles are keyed by their object id; bodies owned by a preset use
/// fixed sentinel keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKey {
    Object(ObjectId),
    Ground,
    PendulumAnchor,
    PendulumBob(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vector3<f32> },
    /// A body with no collider, used for joint anchors.
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub shape: BodyShape,
    pub mass: f32,
    pub position: Vector3<f32>,
    pub restitution: f32,
}

impl BodyDesc {
    pub fn dynamic_ball(radius: f32, mass: f32, position: Vector3<f32>) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape: BodyShape::Ball { radius },
            mass,
            position,
            restitution: 0.0,
        }
    }

    pub fn fixed(shape: BodyShape, position: Vector3<f32>) -> Self {
        Self {
            kind: BodyKind::Fixed,
            shape,
            mass: 0.0,
            position,
            restitution: 0.0,
        }
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }
}

/// Hinge between two bodies, anchors given in each body's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevoluteJointDesc {
    pub axis: Vector3<f32>,
    pub local_anchor1: Vector3<f32>,
    pub local_anchor2: Vector3<f32>,
}

/// Narrow interface to a rigid-body engine.
pub trait PhysicsBackend {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Removes a body together with its colliders and joints. Unknown
    /// handles are ignored.
    fn remove_body(&mut self, handle: BodyHandle);

    fn set_body_mass(&mut self, handle: BodyHandle, mass: f32);

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vector3<f32>, wake_up: bool);

    fn translation(&self, handle: BodyHandle) -> Option<Vector3<f32>>;

    fn linvel(&self, handle: BodyHandle) -> Option<Vector3<f32>>;

    fn create_revolute_joint(
        &mut self,
        body1: BodyHandle,
        body2: BodyHandle,
        joint: &RevoluteJointDesc,
    ) -> Option<JointHandle>;

    fn set_gravity(&mut self, gravity: Vector3<f32>);

    fn set_paused(&mut self, paused: bool);

    fn is_paused(&self) -> bool;

    /// Advances the world by `dt` seconds. Does nothing while paused.
    fn step(&mut self, dt: f32);

    fn body_count(&self) -> usize;
}
