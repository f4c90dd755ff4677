//! Simulation manager
//!
//! Owns the physics world, the handle registry and the mounted preset, and
//! drives them from [`LabState`] once per frame.

use std::time::Duration;

use log::{info, trace};

use super::pendulum::PendulumPreset;
use super::sandbox::SandboxPreset;
use super::traits::{Preset, PresetContext};
use crate::physics::{BodyHandleRegistry, PhysicsBackend};
use crate::scene::DrawList;
use crate::state::{LabState, SimulationMode};

pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;
pub const DEFAULT_MAX_SUBSTEPS: u32 = 4;

/// Builds the preset for a simulation mode.
pub fn preset_for(mode: SimulationMode) -> Box<dyn Preset> {
    match mode {
        SimulationMode::Sandbox => Box::new(SandboxPreset::new()),
        SimulationMode::DoublePendulum => Box::new(PendulumPreset::new()),
    }
}

pub struct SimulationManager {
    physics: Box<dyn PhysicsBackend>,
    registry: BodyHandleRegistry,
    preset: Option<Box<dyn Preset>>,
    mounted_generation: u64,
    fixed_timestep: f32,
    max_substeps: u32,
    accumulated_time: f32,
}

impl SimulationManager {
    pub fn new(physics: Box<dyn PhysicsBackend>) -> Self {
        Self {
            physics,
            registry: BodyHandleRegistry::new(),
            preset: None,
            mounted_generation: 0,
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
            accumulated_time: 0.0,
        }
    }

    /// Overrides the physics step size and the per-frame substep cap.
    pub fn with_timestep(mut self, fixed_timestep: f32, max_substeps: u32) -> Self {
        if fixed_timestep.is_finite() && fixed_timestep > 0.0 {
            self.fixed_timestep = fixed_timestep;
        }
        self.max_substeps = max_substeps.max(1);
        self
    }

    /// Unmounts the current preset, if any, and mounts `preset`.
    pub fn attach(&mut self, mut preset: Box<dyn Preset>, state: &mut LabState) {
        self.detach(state);

        let mut ctx = PresetContext {
            physics: self.physics.as_mut(),
            registry: &mut self.registry,
        };
        preset.mount(&mut ctx, state);
        info!("attached preset '{}'", preset.name());

        self.preset = Some(preset);
        self.mounted_generation = state.generation();
        self.accumulated_time = 0.0;
    }

    pub fn detach(&mut self, state: &mut LabState) {
        if let Some(mut preset) = self.preset.take() {
            let mut ctx = PresetContext {
                physics: self.physics.as_mut(),
                registry: &mut self.registry,
            };
            preset.unmount(&mut ctx, state);
            info!("detached preset '{}'", preset.name());
        }
    }

    /// Applies the current state to the world: swaps presets on a mode
    /// change, remounts after a reset, reconciles bodies and forwards
    /// gravity and pause.
    pub fn sync(&mut self, state: &mut LabState) {
        let settings = *state.settings();
        self.physics.set_gravity(settings.gravity());
        self.physics.set_paused(settings.paused);

        let mode_changed = self
            .preset
            .as_ref()
            .map_or(true, |preset| preset.mode() != settings.mode);
        if mode_changed {
            self.attach(preset_for(settings.mode), state);
        } else if self.mounted_generation != state.generation() {
            self.remount(state);
        }

        if let Some(preset) = self.preset.as_mut() {
            let mut ctx = PresetContext {
                physics: self.physics.as_mut(),
                registry: &mut self.registry,
            };
            preset.commit(&mut ctx, state);
        }
    }

    fn remount(&mut self, state: &mut LabState) {
        if let Some(preset) = self.preset.as_mut() {
            let mut ctx = PresetContext {
                physics: self.physics.as_mut(),
                registry: &mut self.registry,
            };
            preset.unmount(&mut ctx, state);
            preset.mount(&mut ctx, state);
            info!("remounted preset '{}'", preset.name());
        }
        self.mounted_generation = state.generation();
        self.accumulated_time = 0.0;
    }

    /// Steps physics on the fixed timestep and lets the preset read back.
    pub fn update(&mut self, elapsed: Duration, state: &mut LabState) {
        if !state.settings().paused {
            self.accumulated_time += elapsed.as_secs_f32();

            let mut substeps = 0;
            while self.accumulated_time >= self.fixed_timestep && substeps < self.max_substeps {
                self.physics.step(self.fixed_timestep);
                self.accumulated_time -= self.fixed_timestep;
                substeps += 1;
            }
            if substeps == self.max_substeps {
                // Drop the backlog after a long stall.
                self.accumulated_time = self.accumulated_time.min(self.fixed_timestep);
            }
            trace!("stepped {substeps} substeps");
        }

        if let Some(preset) = self.preset.as_mut() {
            preset.frame(elapsed, self.physics.as_ref(), &self.registry, state);
        }
    }

    pub fn compose(&self, state: &LabState, draw: &mut DrawList) {
        if let Some(preset) = &self.preset {
            preset.compose(self.physics.as_ref(), &self.registry, state, draw);
        }
    }

    pub fn physics(&self) -> &dyn PhysicsBackend {
        self.physics.as_ref()
    }

    pub fn physics_mut(&mut self) -> &mut dyn PhysicsBackend {
        self.physics.as_mut()
    }

    pub fn registry(&self) -> &BodyHandleRegistry {
        &self.registry
    }

    /// Mutable world plus the registry, for resolving pointer gestures.
    pub fn world_mut(&mut self) -> (&mut dyn PhysicsBackend, &BodyHandleRegistry) {
        (self.physics.as_mut(), &self.registry)
    }

    pub fn current_mode(&self) -> Option<SimulationMode> {
        self.preset.as_ref().map(|preset| preset.mode())
    }

    pub fn current_preset_name(&self) -> Option<&str> {
        self.preset.as_ref().map(|preset| preset.name())
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mock::MockPhysics;
    use crate::physics::BodyKey;
    use cgmath::Vector3;

    fn manager() -> SimulationManager {
        SimulationManager::new(Box::new(MockPhysics::new()))
    }

    #[test]
    fn first_sync_mounts_the_selected_mode() {
        let mut manager = manager();
        let mut state = LabState::with_mode(SimulationMode::DoublePendulum);

        manager.sync(&mut state);

        assert_eq!(manager.current_mode(), Some(SimulationMode::DoublePendulum));
        assert_eq!(manager.current_preset_name(), Some("Double Pendulum"));
        assert!(manager.registry().contains(BodyKey::PendulumAnchor));
        assert_eq!(manager.physics().body_count(), 3);
    }

    #[test]
    fn mode_change_swaps_presets_and_bodies() {
        let mut manager = manager();
        let mut state = LabState::new();
        state.add_object(Vector3::new(0.0, 0.5, 0.0));
        manager.sync(&mut state);
        assert_eq!(manager.physics().body_count(), 2);

        state.set_simulation_mode(SimulationMode::DoublePendulum);
        manager.sync(&mut state);

        assert!(!manager.registry().contains(BodyKey::Ground));
        assert!(manager.registry().contains(BodyKey::PendulumBob(1)));
        assert_eq!(manager.physics().body_count(), 3);

        state.set_simulation_mode(SimulationMode::Sandbox);
        manager.sync(&mut state);
        assert_eq!(manager.current_mode(), Some(SimulationMode::Sandbox));
        assert_eq!(manager.physics().body_count(), 2);
    }

    #[test]
    fn reset_remounts_the_current_preset() {
        let mut manager = manager();
        let mut state = LabState::new();
        state.add_object(Vector3::new(0.0, 0.5, 0.0));
        state.add_object(Vector3::new(1.0, 0.5, 1.0));
        manager.sync(&mut state);
        assert_eq!(manager.physics().body_count(), 3);

        state.trigger_reset();
        manager.sync(&mut state);

        assert_eq!(manager.current_mode(), Some(SimulationMode::Sandbox));
        assert_eq!(manager.registry().len(), 1);
        assert_eq!(manager.physics().body_count(), 1);
    }

    #[test]
    fn update_steps_on_the_fixed_timestep() {
        let mut manager = manager().with_timestep(0.01, 100);
        let mut state = LabState::new();
        let id = state.add_object(Vector3::new(0.0, 5.0, 0.0));
        manager.sync(&mut state);

        manager.update(Duration::from_millis(105), &mut state);

        let handle = manager.registry().get(BodyKey::Object(id)).unwrap();
        let y = manager.physics().translation(handle).unwrap().y;
        assert!(y < 5.0, "particle should fall, got y = {y}");
    }

    #[test]
    fn paused_updates_do_not_move_bodies() {
        let mut manager = manager();
        let mut state = LabState::new();
        let id = state.add_object(Vector3::new(0.0, 5.0, 0.0));
        state.set_paused(true);
        manager.sync(&mut state);
        assert!(manager.physics().is_paused());

        for _ in 0..10 {
            manager.update(Duration::from_millis(16), &mut state);
        }

        let handle = manager.registry().get(BodyKey::Object(id)).unwrap();
        assert_eq!(manager.physics().translation(handle).unwrap().y, 5.0);
    }

    #[test]
    fn long_stalls_are_capped_at_max_substeps() {
        let mut manager = manager().with_timestep(0.01, 3);
        let mut state = LabState::new();
        let id = state.add_object(Vector3::new(0.0, 100.0, 0.0));
        manager.sync(&mut state);

        manager.update(Duration::from_secs(5), &mut state);
        let handle = manager.registry().get(BodyKey::Object(id)).unwrap();
        let after_stall = manager.physics().linvel(handle).unwrap().y;

        // Three substeps of 0.01 s under -9.81 gravity.
        assert!((after_stall - (-9.81 * 0.03)).abs() < 1e-4);
    }

    #[test]
    fn gravity_changes_are_forwarded() {
        let mut manager = manager().with_timestep(0.1, 1);
        let mut state = LabState::new();
        let id = state.add_object(Vector3::new(0.0, 5.0, 0.0));
        state.set_gravity(0.0);
        manager.sync(&mut state);

        manager.update(Duration::from_millis(150), &mut state);

        let handle = manager.registry().get(BodyKey::Object(id)).unwrap();
        assert_eq!(manager.physics().linvel(handle).unwrap(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn detach_leaves_an_empty_world() {
        let mut manager = manager();
        let mut state = LabState::with_mode(SimulationMode::DoublePendulum);
        manager.sync(&mut state);

        manager.detach(&mut state);

        assert_eq!(manager.current_mode(), None);
        assert!(manager.registry().is_empty());
        assert_eq!(manager.physics().body_count(), 0);
    }
}
