//! rapier3d implementation of [`PhysicsBackend`].

use std::collections::HashMap;

use cgmath::Vector3;
use log::{debug, trace};
use rapier3d::na::{Point3, Unit, Vector3 as NaVector3};
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    RevoluteJointBuilder, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};

use super::{
    BodyDesc, BodyHandle, BodyKind, BodyShape, JointHandle, PhysicsBackend, RevoluteJointDesc,
};

/// A self-contained rapier world with its pipeline state.
pub struct RapierWorld {
    gravity: NaVector3<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    bodies: HashMap<BodyHandle, RigidBodyHandle>,
    next_body: u64,
    next_joint: u64,
    paused: bool,
}

impl RapierWorld {
    pub fn new(gravity: Vector3<f32>) -> Self {
        Self {
            gravity: to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: HashMap::new(),
            next_body: 1,
            next_joint: 1,
            paused: false,
        }
    }

    fn resolve(&self, handle: BodyHandle) -> Option<RigidBodyHandle> {
        self.bodies.get(&handle).copied()
    }
}

impl PhysicsBackend for RapierWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        let rigid_body = builder.translation(to_na(desc.position)).build();
        let rigid_handle = self.rigid_body_set.insert(rigid_body);

        let collider = match desc.shape {
            BodyShape::Ball { radius } => Some(ColliderBuilder::ball(radius)),
            BodyShape::Cuboid { half_extents } => Some(ColliderBuilder::cuboid(
                half_extents.x,
                half_extents.y,
                half_extents.z,
            )),
            BodyShape::Point => None,
        };
        if let Some(collider) = collider {
            let mut collider = collider.restitution(desc.restitution);
            if desc.kind == BodyKind::Dynamic {
                collider = collider.mass(desc.mass);
            }
            self.collider_set.insert_with_parent(
                collider.build(),
                rigid_handle,
                &mut self.rigid_body_set,
            );
        }

        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(handle, rigid_handle);
        debug!("created {:?} body {:?} at {:?}", desc.kind, handle, desc.position);
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        let Some(rigid_handle) = self.bodies.remove(&handle) else {
            return;
        };
        self.rigid_body_set.remove(
            rigid_handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        debug!("removed body {:?}", handle);
    }

    fn set_body_mass(&mut self, handle: BodyHandle, mass: f32) {
        let Some(rigid_handle) = self.resolve(handle) else {
            return;
        };
        let colliders: Vec<ColliderHandle> = match self.rigid_body_set.get(rigid_handle) {
            Some(body) => body.colliders().to_vec(),
            None => return,
        };
        for collider_handle in colliders {
            if let Some(collider) = self.collider_set.get_mut(collider_handle) {
                collider.set_mass(mass);
            }
        }
        if let Some(body) = self.rigid_body_set.get_mut(rigid_handle) {
            body.wake_up(true);
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vector3<f32>, wake_up: bool) {
        let Some(rigid_handle) = self.resolve(handle) else {
            return;
        };
        if let Some(body) = self.rigid_body_set.get_mut(rigid_handle) {
            body.apply_impulse(to_na(impulse), wake_up);
        }
    }

    fn translation(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        let body = self.rigid_body_set.get(self.resolve(handle)?)?;
        Some(from_na(body.translation()))
    }

    fn linvel(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        let body = self.rigid_body_set.get(self.resolve(handle)?)?;
        Some(from_na(body.linvel()))
    }

    fn create_revolute_joint(
        &mut self,
        body1: BodyHandle,
        body2: BodyHandle,
        joint: &RevoluteJointDesc,
    ) -> Option<JointHandle> {
        let rigid1 = self.resolve(body1)?;
        let rigid2 = self.resolve(body2)?;

        let revolute = RevoluteJointBuilder::new(Unit::new_normalize(to_na(joint.axis)))
            .local_anchor1(to_point(joint.local_anchor1))
            .local_anchor2(to_point(joint.local_anchor2));
        self.impulse_joint_set.insert(rigid1, rigid2, revolute, true);

        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;
        Some(handle)
    }

    fn set_gravity(&mut self, gravity: Vector3<f32>) {
        self.gravity = to_na(gravity);
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn step(&mut self, dt: f32) {
        if self.paused || dt <= 0.0 {
            return;
        }
        trace!("rapier step dt={dt}");
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

fn to_na(v: Vector3<f32>) -> NaVector3<f32> {
    NaVector3::new(v.x, v.y, v.z)
}

fn to_point(v: Vector3<f32>) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

fn from_na(v: &NaVector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn dynamic_bodies_fall_under_gravity() {
        let mut world = RapierWorld::new(Vector3::new(0.0, -9.81, 0.0));
        let ball = world.create_body(&BodyDesc::dynamic_ball(0.5, 1.0, Vector3::new(0.0, 5.0, 0.0)));

        for _ in 0..30 {
            world.step(DT);
        }

        let y = world.translation(ball).unwrap().y;
        assert!(y < 5.0, "ball should have fallen, y = {y}");
    }

    #[test]
    fn paused_world_does_not_move() {
        let mut world = RapierWorld::new(Vector3::new(0.0, -9.81, 0.0));
        let ball = world.create_body(&BodyDesc::dynamic_ball(0.5, 1.0, Vector3::new(0.0, 5.0, 0.0)));
        world.set_paused(true);

        for _ in 0..30 {
            world.step(DT);
        }

        assert_eq!(world.translation(ball), Some(Vector3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn impulse_changes_velocity_by_impulse_over_mass() {
        let mut world = RapierWorld::new(Vector3::new(0.0, 0.0, 0.0));
        let ball = world.create_body(&BodyDesc::dynamic_ball(0.5, 2.0, Vector3::new(0.0, 5.0, 0.0)));
        world.step(DT);

        world.apply_impulse(ball, Vector3::new(10.0, 0.0, 0.0), true);

        let velocity = world.linvel(ball).unwrap();
        assert!((velocity.x - 5.0).abs() < 1e-3, "vx = {}", velocity.x);
    }

    #[test]
    fn removed_handles_stop_resolving() {
        let mut world = RapierWorld::new(Vector3::new(0.0, -9.81, 0.0));
        let ball = world.create_body(&BodyDesc::dynamic_ball(0.5, 1.0, Vector3::new(0.0, 1.0, 0.0)));
        assert_eq!(world.body_count(), 1);

        world.remove_body(ball);
        world.remove_body(ball);
        world.apply_impulse(ball, Vector3::new(1.0, 0.0, 0.0), true);

        assert_eq!(world.body_count(), 0);
        assert!(world.translation(ball).is_none());
        assert!(world.linvel(ball).is_none());
    }

    #[test]
    fn joints_need_live_bodies() {
        let mut world = RapierWorld::new(Vector3::new(0.0, -9.81, 0.0));
        let anchor = world.create_body(&BodyDesc::fixed(BodyShape::Point, Vector3::new(0.0, 0.0, 0.0)));
        let bob = world.create_body(&BodyDesc::dynamic_ball(0.5, 1.0, Vector3::new(0.0, -3.0, 0.0)));
        let joint = RevoluteJointDesc {
            axis: Vector3::new(0.0, 0.0, 1.0),
            local_anchor1: Vector3::new(0.0, 0.0, 0.0),
            local_anchor2: Vector3::new(0.0, 3.0, 0.0),
        };

        assert!(world.create_revolute_joint(anchor, bob, &joint).is_some());
        world.remove_body(bob);
        assert!(world.create_revolute_joint(anchor, bob, &joint).is_none());
    }
}
