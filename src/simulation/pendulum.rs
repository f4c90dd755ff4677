//! Double pendulum preset
//!
//! A fixed anchor at the origin with two ball bobs chained by revolute
//! joints about +Z. Each frame the rods and trails are rebuilt from the bob
//! positions and the system energy is recomputed into a fast buffer; a
//! 10 Hz cadence copies that buffer into the energy history.

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use cgmath::{Vector3, Zero};
use log::info;

use super::energy::{derive_energy, BodySample, SampleCadence};
use super::geometry::{RodTransform, Trail};
use super::traits::{Preset, PresetContext};
use crate::physics::{
    BodyDesc, BodyHandle, BodyHandleRegistry, BodyKey, BodyShape, PhysicsBackend,
    RevoluteJointDesc,
};
use crate::scene::{palette, DrawList};
use crate::state::{EnergyReading, LabState, SimulationMode};

pub const PENDULUM_LENGTH: f32 = 3.0;
pub const BOB_RADIUS: f32 = 0.5;
pub const ANCHOR_RADIUS: f32 = 0.2;
pub const ROD_RADIUS: f32 = 0.05;
pub const ANCHOR_POSITION: Vector3<f32> = Vector3::new(0.0, 0.0, 0.0);
/// Release angles of the two arms, measured from straight down.
///
/// Both arms start horizontal, putting the bobs at (3, 0, 0) and (6, 0, 0).
/// A pendulum resting straight down at (0, -3, 0) and (0, -6, 0) never
/// moves without a push, so the preset releases from horizontal instead
/// and swings as soon as it mounts.
pub const RELEASE_ANGLES: [f32; 2] = [FRAC_PI_2, FRAC_PI_2];

const BOB_KEYS: [BodyKey; 2] = [BodyKey::PendulumBob(0), BodyKey::PendulumBob(1)];
const BOB_COLORS: [[f32; 4]; 2] = [palette::BOB_1, palette::BOB_2];

/// Initial bob centres for the configured release angles.
pub fn release_positions() -> [Vector3<f32>; 2] {
    let arm = |angle: f32| Vector3::new(angle.sin(), -angle.cos(), 0.0) * PENDULUM_LENGTH;
    let first = ANCHOR_POSITION + arm(RELEASE_ANGLES[0]);
    let second = first + arm(RELEASE_ANGLES[1]);
    [first, second]
}

#[derive(Debug, Default)]
pub struct PendulumPreset {
    anchor: Option<BodyHandle>,
    bobs: [Option<BodyHandle>; 2],
    applied_masses: [f32; 2],
    energy: EnergyReading,
    cadence: SampleCadence,
    rods: [RodTransform; 2],
    trails: [Trail; 2],
    trails_epoch: u64,
}

impl PendulumPreset {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent per-frame energy reading.
    pub fn energy(&self) -> EnergyReading {
        self.energy
    }

    pub fn rods(&self) -> &[RodTransform; 2] {
        &self.rods
    }

    pub fn trails(&self) -> &[Trail; 2] {
        &self.trails
    }

    fn clear_trails(&mut self) {
        self.trails.iter_mut().for_each(Trail::clear);
    }

    /// Drops trail points recorded before the last toggle, and everything
    /// while trails are hidden.
    fn settle_trails(&mut self, state: &LabState) {
        let epoch = state.trails_epoch();
        if epoch != self.trails_epoch || !state.settings().show_trails {
            self.clear_trails();
            self.trails_epoch = epoch;
        }
    }
}

impl Preset for PendulumPreset {
    fn mode(&self) -> SimulationMode {
        SimulationMode::DoublePendulum
    }

    fn name(&self) -> &str {
        "Double Pendulum"
    }

    fn mount(&mut self, ctx: &mut PresetContext<'_>, state: &mut LabState) {
        state.energy_mut().clear_history();
        self.cadence.reset();
        self.clear_trails();
        self.trails_epoch = state.trails_epoch();
        self.energy = EnergyReading::default();

        let anchor = ctx
            .physics
            .create_body(&BodyDesc::fixed(BodyShape::Point, ANCHOR_POSITION));
        ctx.registry.register(BodyKey::PendulumAnchor, anchor);

        let masses = state.settings().bob_masses();
        let positions = release_positions();
        let mut bobs = [anchor; 2];
        for i in 0..2 {
            let handle = ctx
                .physics
                .create_body(&BodyDesc::dynamic_ball(BOB_RADIUS, masses[i], positions[i]));
            ctx.registry.register(BOB_KEYS[i], handle);
            bobs[i] = handle;
        }

        // Each hinge sits at the centre of its parent body.
        let parents = [(anchor, ANCHOR_POSITION), (bobs[0], positions[0])];
        for (i, (parent, pivot)) in parents.into_iter().enumerate() {
            let joint = RevoluteJointDesc {
                axis: Vector3::unit_z(),
                local_anchor1: Vector3::zero(),
                local_anchor2: pivot - positions[i],
            };
            ctx.physics.create_revolute_joint(parent, bobs[i], &joint);
        }

        self.anchor = Some(anchor);
        self.bobs = [Some(bobs[0]), Some(bobs[1])];
        self.applied_masses = masses;
        self.rods = [
            RodTransform::between(ANCHOR_POSITION, positions[0]),
            RodTransform::between(positions[0], positions[1]),
        ];
        info!("double pendulum mounted");
    }

    fn commit(&mut self, ctx: &mut PresetContext<'_>, state: &LabState) {
        let masses = state.settings().bob_masses();
        for i in 0..2 {
            if masses[i] == self.applied_masses[i] {
                continue;
            }
            if let Some(handle) = self.bobs[i] {
                ctx.physics.set_body_mass(handle, masses[i]);
            }
            self.applied_masses[i] = masses[i];
        }
        self.settle_trails(state);
    }

    fn frame(
        &mut self,
        elapsed: Duration,
        physics: &dyn PhysicsBackend,
        registry: &BodyHandleRegistry,
        state: &mut LabState,
    ) {
        let read = |key: BodyKey| {
            let handle = registry.get(key)?;
            Some((physics.translation(handle)?, physics.linvel(handle)?))
        };
        let (Some((p1, v1)), Some((p2, v2))) = (read(BOB_KEYS[0]), read(BOB_KEYS[1])) else {
            return;
        };
        let anchor = registry
            .get(BodyKey::PendulumAnchor)
            .and_then(|handle| physics.translation(handle))
            .unwrap_or(ANCHOR_POSITION);

        self.rods = [RodTransform::between(anchor, p1), RodTransform::between(p1, p2)];

        self.settle_trails(state);
        let settings = state.settings();
        if settings.show_trails && !settings.paused {
            self.trails[0].push(p1);
            self.trails[1].push(p2);
        }

        let masses = settings.bob_masses();
        let bodies = [
            BodySample {
                mass: masses[0],
                position: p1,
                velocity: v1,
            },
            BodySample {
                mass: masses[1],
                position: p2,
                velocity: v2,
            },
        ];
        self.energy = derive_energy(&bodies, settings.gravity_y);

        if self.cadence.advance(elapsed) {
            state.energy_mut().add_energy_data_point(self.energy);
        }
    }

    fn compose(
        &self,
        physics: &dyn PhysicsBackend,
        registry: &BodyHandleRegistry,
        state: &LabState,
        draw: &mut DrawList,
    ) {
        let position = |key: BodyKey| registry.get(key).and_then(|h| physics.translation(h));

        if let Some(anchor) = position(BodyKey::PendulumAnchor) {
            draw.push_sphere(anchor, ANCHOR_RADIUS, palette::ANCHOR, 0.0);
        }
        for rod in &self.rods {
            if rod.length > 0.0 {
                draw.push_rod(rod, ROD_RADIUS, palette::ROD);
            }
        }
        for i in 0..2 {
            if let Some(bob) = position(BOB_KEYS[i]) {
                draw.push_sphere(bob, BOB_RADIUS, BOB_COLORS[i], 0.0);
            }
        }
        if state.settings().show_trails {
            for (trail, color) in self.trails.iter().zip(BOB_COLORS) {
                draw.push_line(trail.points(), color);
            }
        }
    }

    fn unmount(&mut self, ctx: &mut PresetContext<'_>, state: &mut LabState) {
        for (i, bob) in self.bobs.iter_mut().enumerate() {
            if let Some(handle) = bob.take() {
                ctx.registry.unregister(BOB_KEYS[i]);
                ctx.physics.remove_body(handle);
            }
        }
        if let Some(anchor) = self.anchor.take() {
            ctx.registry.unregister(BodyKey::PendulumAnchor);
            ctx.physics.remove_body(anchor);
        }
        self.clear_trails();
        self.rods = Default::default();
        self.energy = EnergyReading::default();
        state.energy_mut().clear_history();
        info!("double pendulum unmounted");
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mock::MockPhysics;
    use crate::scene::MeshKind;
    use crate::simulation::geometry::TRAIL_CAPACITY;
    use cgmath::InnerSpace;

    const FRAME: Duration = Duration::from_millis(16);

    struct Harness {
        physics: MockPhysics,
        registry: BodyHandleRegistry,
        state: LabState,
        preset: PendulumPreset,
    }

    impl Harness {
        fn mounted() -> Self {
            let mut harness = Self {
                physics: MockPhysics::new(),
                registry: BodyHandleRegistry::new(),
                state: LabState::with_mode(SimulationMode::DoublePendulum),
                preset: PendulumPreset::new(),
            };
            harness.mount();
            harness
        }

        fn mount(&mut self) {
            let mut ctx = PresetContext {
                physics: &mut self.physics,
                registry: &mut self.registry,
            };
            self.preset.mount(&mut ctx, &mut self.state);
        }

        fn unmount(&mut self) {
            let mut ctx = PresetContext {
                physics: &mut self.physics,
                registry: &mut self.registry,
            };
            self.preset.unmount(&mut ctx, &mut self.state);
        }

        fn commit(&mut self) {
            let mut ctx = PresetContext {
                physics: &mut self.physics,
                registry: &mut self.registry,
            };
            self.preset.commit(&mut ctx, &self.state);
        }

        fn frame(&mut self, elapsed: Duration) {
            self.preset
                .frame(elapsed, &self.physics, &self.registry, &mut self.state);
        }

        fn bob(&self, i: usize) -> BodyHandle {
            self.registry.get(BOB_KEYS[i]).unwrap()
        }
    }

    #[test]
    fn release_positions_are_one_arm_apart() {
        let [first, second] = release_positions();
        assert!(((first - ANCHOR_POSITION).magnitude() - PENDULUM_LENGTH).abs() < 1e-5);
        assert!(((second - first).magnitude() - PENDULUM_LENGTH).abs() < 1e-5);
        assert!((first - Vector3::new(3.0, 0.0, 0.0)).magnitude() < 1e-5);
        assert!((second - Vector3::new(6.0, 0.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn mount_builds_bodies_and_consistent_hinges() {
        let harness = Harness::mounted();
        assert!(harness.registry.contains(BodyKey::PendulumAnchor));
        assert_eq!(harness.physics.body_count(), 3);
        assert_eq!(harness.physics.joints.len(), 2);

        for (parent, child, joint) in &harness.physics.joints {
            let parent_origin = harness.physics.body(*parent).unwrap().position;
            let child_origin = harness.physics.body(*child).unwrap().position;
            let world1 = parent_origin + joint.local_anchor1;
            let world2 = child_origin + joint.local_anchor2;
            assert!((world1 - world2).magnitude() < 1e-5);
            assert_eq!(joint.axis, Vector3::unit_z());
        }
    }

    #[test]
    fn mass_changes_propagate_on_commit() {
        let mut harness = Harness::mounted();
        harness.state.set_mass2(4.0);
        harness.commit();

        let bob = harness.bob(1);
        assert_eq!(harness.physics.body(bob).map(|b| b.mass), Some(4.0));
    }

    #[test]
    fn frame_derives_energy_from_bob_states() {
        let mut harness = Harness::mounted();
        let (b0, b1) = (harness.bob(0), harness.bob(1));
        harness
            .physics
            .place(b0, Vector3::new(0.0, -3.0, 0.0), Vector3::new(2.0, 0.0, 0.0));
        harness
            .physics
            .place(b1, Vector3::new(0.0, -6.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        harness.state.set_gravity(-10.0);

        harness.frame(FRAME);

        let energy = harness.preset.energy();
        assert!((energy.kinetic - 2.0).abs() < 1e-5);
        assert!((energy.potential - (-30.0 - 60.0)).abs() < 1e-4);
        assert!((harness.preset.rods()[1].length - 3.0).abs() < 1e-5);
    }

    #[test]
    fn history_is_sampled_at_a_fixed_cadence() {
        let mut harness = Harness::mounted();
        for _ in 0..5 {
            harness.frame(FRAME);
        }
        assert!(harness.state.energy().is_empty());

        for _ in 0..120 {
            harness.frame(FRAME);
        }
        let samples = harness.state.energy().len();
        assert!((18..=20).contains(&samples), "{samples} samples in ~2s");
    }

    #[test]
    fn remount_starts_with_empty_history() {
        let mut harness = Harness::mounted();
        harness.frame(Duration::from_millis(150));
        assert_eq!(harness.state.energy().len(), 1);

        harness.unmount();
        assert!(harness.state.energy().is_empty());
        assert!(harness.registry.is_empty());
        assert_eq!(harness.physics.body_count(), 0);

        harness.mount();
        assert!(harness.state.energy().is_empty());
        assert_eq!(harness.registry.len(), BOB_KEYS.len() + 1);
    }

    #[test]
    fn trails_are_bounded_and_reset_when_hidden() {
        let mut harness = Harness::mounted();
        for _ in 0..(TRAIL_CAPACITY + 40) {
            harness.frame(FRAME);
        }
        assert!(harness.preset.trails().iter().all(|t| t.len() == TRAIL_CAPACITY));

        harness.state.toggle_trails();
        harness.commit();
        assert!(harness.preset.trails().iter().all(Trail::is_empty));

        harness.state.toggle_trails();
        harness.commit();
        assert!(harness.preset.trails().iter().all(Trail::is_empty));
        harness.frame(FRAME);
        assert!(harness.preset.trails().iter().all(|t| t.len() == 1));
    }

    #[test]
    fn double_toggle_between_syncs_discards_old_points() {
        let mut harness = Harness::mounted();
        for _ in 0..10 {
            harness.frame(FRAME);
        }
        assert!(harness.preset.trails().iter().all(|t| t.len() == 10));

        harness.state.toggle_trails();
        harness.state.toggle_trails();
        assert!(harness.state.settings().show_trails);
        harness.commit();
        assert!(harness.preset.trails().iter().all(Trail::is_empty));

        harness.state.toggle_trails();
        harness.state.toggle_trails();
        harness.frame(FRAME);
        assert!(harness.preset.trails().iter().all(|t| t.len() == 1));
    }

    #[test]
    fn paused_frames_do_not_grow_trails() {
        let mut harness = Harness::mounted();
        harness.frame(FRAME);
        harness.state.set_paused(true);
        harness.frame(FRAME);
        harness.frame(FRAME);
        assert!(harness.preset.trails().iter().all(|t| t.len() == 1));
    }

    #[test]
    fn compose_draws_anchor_bobs_rods_and_trails() {
        let mut harness = Harness::mounted();
        harness.frame(FRAME);
        harness.frame(FRAME);

        let mut draw = DrawList::new();
        harness
            .preset
            .compose(&harness.physics, &harness.registry, &harness.state, &mut draw);

        assert_eq!(draw.count(MeshKind::Sphere), 3);
        assert_eq!(draw.count(MeshKind::Cylinder), 2);
        assert_eq!(draw.lines.len(), 2);
    }

    #[test]
    fn missing_bodies_leave_the_frame_untouched() {
        let mut preset = PendulumPreset::new();
        let physics = MockPhysics::new();
        let registry = BodyHandleRegistry::new();
        let mut state = LabState::with_mode(SimulationMode::DoublePendulum);

        preset.frame(Duration::from_secs(1), &physics, &registry, &mut state);

        assert!(state.energy().is_empty());
        assert_eq!(preset.energy(), EnergyReading::default());
    }
}
