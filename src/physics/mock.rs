//! Recording backend for tests.

use std::collections::BTreeMap;

use cgmath::{InnerSpace, Vector3, Zero};

use super::{BodyDesc, BodyHandle, BodyKind, JointHandle, PhysicsBackend, RevoluteJointDesc};

#[derive(Debug, Clone, Copy)]
pub struct MockBody {
    pub desc: BodyDesc,
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub mass: f32,
}

/// Point-mass integrator that records every call made through
/// [`PhysicsBackend`].
#[derive(Debug, Default)]
pub struct MockPhysics {
    pub bodies: BTreeMap<BodyHandle, MockBody>,
    pub impulses: Vec<(BodyHandle, Vector3<f32>)>,
    pub joints: Vec<(BodyHandle, BodyHandle, RevoluteJointDesc)>,
    pub gravity: Option<Vector3<f32>>,
    pub paused: bool,
    pub steps: usize,
    next_handle: u64,
}

impl MockPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&MockBody> {
        self.bodies.get(&handle)
    }

    /// Teleports a body, for arranging read-path tests.
    pub fn place(&mut self, handle: BodyHandle, position: Vector3<f32>, velocity: Vector3<f32>) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.position = position;
            body.velocity = velocity;
        }
    }
}

impl PhysicsBackend for MockPhysics {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        self.next_handle += 1;
        let handle = BodyHandle(self.next_handle);
        self.bodies.insert(
            handle,
            MockBody {
                desc: *desc,
                position: desc.position,
                velocity: Vector3::zero(),
                mass: desc.mass,
            },
        );
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
        self.joints.retain(|(a, b, _)| *a != handle && *b != handle);
    }

    fn set_body_mass(&mut self, handle: BodyHandle, mass: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.mass = mass;
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vector3<f32>, _wake_up: bool) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            self.impulses.push((handle, impulse));
            if body.desc.kind == BodyKind::Dynamic && body.mass > 0.0 {
                body.velocity += impulse / body.mass;
            }
        }
    }

    fn translation(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(&handle).map(|body| body.position)
    }

    fn linvel(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(&handle).map(|body| body.velocity)
    }

    fn create_revolute_joint(
        &mut self,
        body1: BodyHandle,
        body2: BodyHandle,
        joint: &RevoluteJointDesc,
    ) -> Option<JointHandle> {
        if !self.bodies.contains_key(&body1) || !self.bodies.contains_key(&body2) {
            return None;
        }
        debug_assert!(joint.axis.magnitude() > 0.0);
        self.joints.push((body1, body2, *joint));
        Some(JointHandle(self.joints.len() as u64))
    }

    fn set_gravity(&mut self, gravity: Vector3<f32>) {
        self.gravity = Some(gravity);
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn step(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.steps += 1;
        let gravity = self.gravity.unwrap_or_else(Vector3::zero);
        for body in self.bodies.values_mut() {
            if body.desc.kind == BodyKind::Dynamic {
                body.velocity += gravity * dt;
                body.position += body.velocity * dt;
            }
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
