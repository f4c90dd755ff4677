//! Particle sandbox preset
//!
//! A static ground slab plus one ball body per stored particle. Bodies are
//! reconciled against the scene object store on every commit: new objects
//! mount, removed objects unmount, mass edits propagate to the live body.

use std::collections::BTreeMap;

use cgmath::Vector3;
use log::{debug, info};

use super::traits::{Preset, PresetContext};
use crate::physics::{
    BodyDesc, BodyHandle, BodyHandleRegistry, BodyKey, BodyShape, PhysicsBackend,
};
use crate::scene::{palette, DrawList};
use crate::state::{LabState, ObjectId, SimulationMode};

pub const PARTICLE_RADIUS: f32 = 0.5;
pub const PARTICLE_RESTITUTION: f32 = 0.7;
pub const GROUND_HALF_EXTENTS: Vector3<f32> = Vector3::new(50.0, 0.1, 50.0);
pub const GROUND_CENTER: Vector3<f32> = Vector3::new(0.0, -0.1, 0.0);

#[derive(Debug, Clone, Copy)]
struct MountedParticle {
    handle: BodyHandle,
    mass: f32,
}

#[derive(Debug, Default)]
pub struct SandboxPreset {
    ground: Option<BodyHandle>,
    particles: BTreeMap<ObjectId, MountedParticle>,
}

impl SandboxPreset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted_count(&self) -> usize {
        self.particles.len()
    }

    fn unmount_particle(&mut self, id: ObjectId, ctx: &mut PresetContext<'_>) {
        if let Some(particle) = self.particles.remove(&id) {
            ctx.registry.unregister(BodyKey::Object(id));
            ctx.physics.remove_body(particle.handle);
            debug!("unmounted {id}");
        }
    }
}

impl Preset for SandboxPreset {
    fn mode(&self) -> SimulationMode {
        SimulationMode::Sandbox
    }

    fn name(&self) -> &str {
        "Sandbox"
    }

    fn mount(&mut self, ctx: &mut PresetContext<'_>, state: &mut LabState) {
        let ground = ctx.physics.create_body(&BodyDesc::fixed(
            BodyShape::Cuboid {
                half_extents: GROUND_HALF_EXTENTS,
            },
            GROUND_CENTER,
        ));
        ctx.registry.register(BodyKey::Ground, ground);
        self.ground = Some(ground);
        info!("sandbox mounted");
        self.commit(ctx, state);
    }

    fn commit(&mut self, ctx: &mut PresetContext<'_>, state: &LabState) {
        let objects = state.scene().snapshot();

        let stale: Vec<ObjectId> = self
            .particles
            .keys()
            .copied()
            .filter(|id| !objects.iter().any(|object| object.id == *id))
            .collect();
        for id in stale {
            self.unmount_particle(id, ctx);
        }

        for object in objects.iter() {
            match self.particles.get_mut(&object.id) {
                Some(particle) => {
                    if particle.mass != object.mass {
                        ctx.physics.set_body_mass(particle.handle, object.mass);
                        particle.mass = object.mass;
                    }
                }
                None => {
                    let handle = ctx.physics.create_body(
                        &BodyDesc::dynamic_ball(PARTICLE_RADIUS, object.mass, object.position)
                            .with_restitution(PARTICLE_RESTITUTION),
                    );
                    ctx.registry.register(BodyKey::Object(object.id), handle);
                    self.particles.insert(
                        object.id,
                        MountedParticle {
                            handle,
                            mass: object.mass,
                        },
                    );
                    debug!("mounted {}", object.id);
                }
            }
        }
    }

    fn compose(
        &self,
        physics: &dyn PhysicsBackend,
        registry: &BodyHandleRegistry,
        state: &LabState,
        draw: &mut DrawList,
    ) {
        let selected = state.selected_object_id();
        for object in state.scene().objects() {
            let Some(position) = registry
                .get(BodyKey::Object(object.id))
                .and_then(|handle| physics.translation(handle))
            else {
                continue;
            };
            if selected == Some(object.id) {
                draw.push_sphere(position, PARTICLE_RADIUS, palette::SELECTED, 0.5);
            } else {
                draw.push_sphere(position, PARTICLE_RADIUS, palette::PARTICLE, 0.0);
            }
        }
    }

    fn unmount(&mut self, ctx: &mut PresetContext<'_>, _state: &mut LabState) {
        let ids: Vec<ObjectId> = self.particles.keys().copied().collect();
        for id in ids {
            self.unmount_particle(id, ctx);
        }
        if let Some(ground) = self.ground.take() {
            ctx.registry.unregister(BodyKey::Ground);
            ctx.physics.remove_body(ground);
        }
        info!("sandbox unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mock::MockPhysics;
    use crate::scene::MeshKind;

    struct Harness {
        physics: MockPhysics,
        registry: BodyHandleRegistry,
        state: LabState,
        preset: SandboxPreset,
    }

    impl Harness {
        fn mounted() -> Self {
            let mut harness = Self {
                physics: MockPhysics::new(),
                registry: BodyHandleRegistry::new(),
                state: LabState::new(),
                preset: SandboxPreset::new(),
            };
            let mut ctx = PresetContext {
                physics: &mut harness.physics,
                registry: &mut harness.registry,
            };
            harness.preset.mount(&mut ctx, &mut harness.state);
            harness
        }

        fn commit(&mut self) {
            let mut ctx = PresetContext {
                physics: &mut self.physics,
                registry: &mut self.registry,
            };
            self.preset.commit(&mut ctx, &self.state);
        }
    }

    #[test]
    fn mount_registers_the_ground() {
        let harness = Harness::mounted();
        assert!(harness.registry.contains(BodyKey::Ground));
        assert_eq!(harness.physics.body_count(), 1);
    }

    #[test]
    fn bodies_follow_the_object_store() {
        let mut harness = Harness::mounted();
        let a = harness.state.add_object(Vector3::new(0.0, 0.5, 0.0));
        let b = harness.state.add_object(Vector3::new(2.0, 0.5, 0.0));
        harness.commit();

        assert_eq!(harness.preset.mounted_count(), 2);
        let handle = harness.registry.get(BodyKey::Object(a)).unwrap();
        let body = harness.physics.body(handle).unwrap();
        assert_eq!(body.desc.restitution, PARTICLE_RESTITUTION);
        assert_eq!(body.desc.shape, BodyShape::Ball { radius: PARTICLE_RADIUS });
        assert!(harness.registry.contains(BodyKey::Object(b)));

        harness.state.clear_scene();
        harness.commit();

        assert_eq!(harness.preset.mounted_count(), 0);
        assert!(!harness.registry.contains(BodyKey::Object(a)));
        assert!(!harness.registry.contains(BodyKey::Object(b)));
        assert_eq!(harness.physics.body_count(), 1);
    }

    #[test]
    fn mass_edits_reach_the_live_body() {
        let mut harness = Harness::mounted();
        let id = harness.state.add_object(Vector3::new(0.0, 0.5, 0.0));
        harness.commit();

        harness.state.update_object_mass(id, 7.5);
        harness.commit();

        let handle = harness.registry.get(BodyKey::Object(id)).unwrap();
        assert_eq!(harness.physics.body(handle).map(|b| b.mass), Some(7.5));
    }

    #[test]
    fn compose_highlights_the_selection() {
        let mut harness = Harness::mounted();
        let a = harness.state.add_object(Vector3::new(0.0, 0.5, 0.0));
        harness.state.add_object(Vector3::new(2.0, 0.5, 0.0));
        harness.commit();
        harness.state.select_object(Some(a));

        let mut draw = DrawList::new();
        harness
            .preset
            .compose(&harness.physics, &harness.registry, &harness.state, &mut draw);

        assert_eq!(draw.count(MeshKind::Sphere), 2);
        assert_eq!(draw.meshes[0].color, palette::SELECTED);
        assert_eq!(draw.meshes[1].color, palette::PARTICLE);
    }

    #[test]
    fn objects_without_bodies_are_skipped() {
        let mut harness = Harness::mounted();
        harness.state.add_object(Vector3::new(0.0, 0.5, 0.0));

        let mut draw = DrawList::new();
        harness
            .preset
            .compose(&harness.physics, &harness.registry, &harness.state, &mut draw);
        assert!(draw.meshes.is_empty());
    }

    #[test]
    fn unmount_removes_everything() {
        let mut harness = Harness::mounted();
        harness.state.add_object(Vector3::new(0.0, 0.5, 0.0));
        harness.commit();

        let mut ctx = PresetContext {
            physics: &mut harness.physics,
            registry: &mut harness.registry,
        };
        harness.preset.unmount(&mut ctx, &mut harness.state);

        assert!(harness.registry.is_empty());
        assert_eq!(harness.physics.body_count(), 0);
    }
}
