//! Application state
//!
//! [`LabState`] is the single application context. It composes the scene
//! object store, the simulation settings, the energy history and the
//! interaction state, and owns the rules that cut across them (adding an
//! object forces select mode, entering add mode clears the selection, and
//! so on). UI controls talk to it through [`LabCommand`].

pub mod energy;
pub mod scene_store;
pub mod settings;

use cgmath::Vector3;
use log::{debug, info};

use crate::interaction::{InteractionMode, InteractionState};

pub use energy::{EnergyDataPoint, EnergyHistory, EnergyReading, MAX_ENERGY_HISTORY};
pub use scene_store::{
    InteractiveObject, ObjectId, SceneStore, DEFAULT_PARTICLE_MASS, PARTICLE_SPAWN_HEIGHT,
};
pub use settings::{SimulationMode, SimulationSettings, DEFAULT_GRAVITY_Y};

/// A state change requested by the control panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabCommand {
    SetGravity(f32),
    TogglePause,
    Reset,
    SetInteractionMode(InteractionMode),
    ClearScene,
    SelectObject(Option<ObjectId>),
    UpdateObjectMass { id: ObjectId, mass: f32 },
    SetSimulationMode(SimulationMode),
    SetMass1(f32),
    SetMass2(f32),
    ToggleTrails,
}

#[derive(Debug, Clone, Default)]
pub struct LabState {
    scene: SceneStore,
    settings: SimulationSettings,
    energy: EnergyHistory,
    interaction: InteractionState,
    generation: u64,
    trails_epoch: u64,
}

impl LabState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: SimulationMode) -> Self {
        let mut state = Self::new();
        state.settings.mode = mode;
        state
    }

    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn energy(&self) -> &EnergyHistory {
        &self.energy
    }

    pub fn energy_mut(&mut self) -> &mut EnergyHistory {
        &mut self.energy
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut InteractionState {
        &mut self.interaction
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn selected_object_id(&self) -> Option<ObjectId> {
        self.scene.selected()
    }

    /// Bumped by every full reset so mounted presets can rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bumped by every trails toggle. Trail points recorded under an older
    /// epoch must not be shown again.
    pub fn trails_epoch(&self) -> u64 {
        self.trails_epoch
    }

    /// Places a particle at `position` and switches to select mode.
    pub fn add_object(&mut self, position: Vector3<f32>) -> ObjectId {
        let id = self.scene.insert(position, DEFAULT_PARTICLE_MASS);
        self.interaction.set_mode(InteractionMode::Select);
        info!("added {id} at ({:.2}, {:.2}, {:.2})", position.x, position.y, position.z);
        self.debug_check();
        id
    }

    pub fn update_object_mass(&mut self, id: ObjectId, mass: f32) {
        let mass = settings::clamp_to(mass, &settings::PARTICLE_MASS_RANGE);
        if self.scene.set_mass(id, mass) {
            debug!("{id} mass -> {mass:.2}");
        }
    }

    /// Selecting an id forces select mode; clearing leaves the mode alone.
    pub fn select_object(&mut self, id: Option<ObjectId>) {
        if !self.scene.set_selected(id) {
            debug!("ignoring selection of unknown object {id:?}");
            return;
        }
        self.interaction.set_mode(InteractionMode::Select);
        self.debug_check();
    }

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        if mode == InteractionMode::Add {
            self.scene.set_selected(None);
        }
        self.interaction.set_mode(mode);
        debug!("interaction mode -> {mode:?}");
        self.debug_check();
    }

    pub fn clear_scene(&mut self) {
        self.scene.clear();
        self.interaction.cancel_gesture();
        info!("scene cleared");
        self.debug_check();
    }

    /// Returns the lab to its defaults: no particles, no selection, default
    /// gravity, masses and trails, running, empty energy history. The active
    /// preset is kept and remounted from scratch.
    pub fn trigger_reset(&mut self) {
        self.scene.clear();
        self.settings = SimulationSettings {
            mode: self.settings.mode,
            ..SimulationSettings::default()
        };
        self.energy.clear_history();
        self.interaction.set_mode(InteractionMode::Select);
        self.generation += 1;
        info!("lab reset (generation {})", self.generation);
        self.debug_check();
    }

    pub fn set_simulation_mode(&mut self, mode: SimulationMode) {
        if self.settings.mode == mode {
            return;
        }
        self.settings.mode = mode;
        self.energy.clear_history();
        self.interaction.cancel_gesture();
        info!("simulation mode -> {mode}");
        self.debug_check();
    }

    pub fn set_gravity(&mut self, gravity_y: f32) {
        self.settings.set_gravity_y(gravity_y);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.settings.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.settings.paused = !self.settings.paused;
        info!(
            "simulation {}",
            if self.settings.paused { "paused" } else { "resumed" }
        );
    }

    pub fn set_mass1(&mut self, mass: f32) {
        self.settings.set_mass1(mass);
    }

    pub fn set_mass2(&mut self, mass: f32) {
        self.settings.set_mass2(mass);
    }

    pub fn toggle_trails(&mut self) {
        self.settings.show_trails = !self.settings.show_trails;
        self.trails_epoch += 1;
    }

    pub fn apply(&mut self, command: LabCommand) {
        match command {
            LabCommand::SetGravity(gravity_y) => self.set_gravity(gravity_y),
            LabCommand::TogglePause => self.toggle_pause(),
            LabCommand::Reset => self.trigger_reset(),
            LabCommand::SetInteractionMode(mode) => self.set_interaction_mode(mode),
            LabCommand::ClearScene => self.clear_scene(),
            LabCommand::SelectObject(id) => self.select_object(id),
            LabCommand::UpdateObjectMass { id, mass } => self.update_object_mass(id, mass),
            LabCommand::SetSimulationMode(mode) => self.set_simulation_mode(mode),
            LabCommand::SetMass1(mass) => self.set_mass1(mass),
            LabCommand::SetMass2(mass) => self.set_mass2(mass),
            LabCommand::ToggleTrails => self.toggle_trails(),
        }
    }

    pub fn debug_check(&self) {
        self.scene.debug_check();
        self.interaction.debug_check();
        debug_assert!(
            self.interaction
                .gesture()
                .map_or(true, |gesture| self.scene.contains(gesture.object)),
            "a force gesture must target a stored object"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn at(x: f32, z: f32) -> Vector3<f32> {
        Vector3::new(x, PARTICLE_SPAWN_HEIGHT, z)
    }

    #[test]
    fn add_object_sequences_keep_ids_unique_and_force_select() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let mut state = LabState::new();
            let count = rng.random_range(1..40);
            for _ in 0..count {
                if rng.random_bool(0.3) {
                    state.set_interaction_mode(InteractionMode::Add);
                }
                let position = at(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
                let before = state.scene().len();
                let id = state.add_object(position);

                assert_eq!(state.scene().len(), before + 1);
                assert_eq!(state.interaction_mode(), InteractionMode::Select);
                let last = state.scene().objects().last().copied().unwrap();
                assert_eq!(last.id, id);
                assert_eq!(last.mass, DEFAULT_PARTICLE_MASS);
                assert_eq!(last.position, position);
            }
            state.debug_check();
        }
    }

    #[test]
    fn entering_add_mode_clears_selection_and_gesture() {
        let mut state = LabState::new();
        let id = state.add_object(at(0.0, 0.0));
        state.select_object(Some(id));
        state.set_interaction_mode(InteractionMode::Force);
        state
            .interaction_mut()
            .begin_gesture(id, Vector3::new(0.0, 1.0, 0.0));

        state.set_interaction_mode(InteractionMode::Add);

        assert_eq!(state.selected_object_id(), None);
        assert!(state.interaction().gesture().is_none());
    }

    #[test]
    fn entering_force_mode_keeps_selection() {
        let mut state = LabState::new();
        let id = state.add_object(at(0.0, 0.0));
        state.select_object(Some(id));
        state.set_interaction_mode(InteractionMode::Force);
        assert_eq!(state.selected_object_id(), Some(id));
    }

    #[test]
    fn selecting_or_clearing_returns_to_select_mode() {
        let mut state = LabState::new();
        let id = state.add_object(at(0.0, 0.0));
        state.select_object(Some(id));
        state.set_interaction_mode(InteractionMode::Force);

        state.select_object(None);
        assert_eq!(state.interaction_mode(), InteractionMode::Select);
        assert_eq!(state.selected_object_id(), None);

        state.set_interaction_mode(InteractionMode::Force);
        state.select_object(Some(id));
        assert_eq!(state.interaction_mode(), InteractionMode::Select);
        assert_eq!(state.selected_object_id(), Some(id));
    }

    #[test]
    fn three_objects_then_select_then_clear() {
        let mut state = LabState::new();
        let ids: Vec<ObjectId> = [at(0.0, 0.0), at(1.0, 1.0), at(2.0, 2.0)]
            .into_iter()
            .map(|position| {
                state.set_interaction_mode(InteractionMode::Add);
                state.add_object(position)
            })
            .collect();

        assert_eq!(state.scene().len(), 3);
        assert!(state.scene().objects().iter().all(|object| object.mass == 1.0));
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
        assert_eq!(state.interaction_mode(), InteractionMode::Select);

        state.select_object(Some(ids[1]));
        assert_eq!(state.selected_object_id(), Some(ids[1]));

        state.clear_scene();
        assert!(state.scene().is_empty());
        assert_eq!(state.selected_object_id(), None);
        assert!(state.interaction().gesture().is_none());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = LabState::new();
        let id = state.add_object(at(0.0, 0.0));
        state.select_object(Some(id));
        state.set_paused(true);
        state.set_gravity(-3.0);
        state.set_mass1(5.0);
        state.set_mass2(0.5);
        state.toggle_trails();
        state.energy_mut().push_at(1.0, EnergyReading::new(1.0, 1.0));
        state.set_interaction_mode(InteractionMode::Force);
        state
            .interaction_mut()
            .begin_gesture(id, Vector3::new(0.0, 1.0, 0.0));
        let generation = state.generation();

        state.trigger_reset();

        assert!(state.scene().is_empty());
        assert_eq!(state.selected_object_id(), None);
        assert!(!state.settings().paused);
        assert_eq!(state.settings().gravity_y, -9.81);
        assert_eq!(state.interaction_mode(), InteractionMode::Select);
        assert!(state.interaction().gesture().is_none());
        assert_eq!(state.settings().bob_masses(), [1.0, 1.0]);
        assert!(state.settings().show_trails);
        assert!(state.energy().is_empty());
        assert_eq!(state.generation(), generation + 1);
    }

    #[test]
    fn switching_simulation_mode_clears_history_and_gesture() {
        let mut state = LabState::new();
        let id = state.add_object(at(0.0, 0.0));
        state.energy_mut().push_at(1.0, EnergyReading::new(1.0, 1.0));
        state.set_interaction_mode(InteractionMode::Force);
        state
            .interaction_mut()
            .begin_gesture(id, Vector3::new(0.0, 1.0, 0.0));

        state.set_simulation_mode(SimulationMode::DoublePendulum);

        assert!(state.energy().is_empty());
        assert!(state.interaction().gesture().is_none());
        assert_eq!(state.settings().mode, SimulationMode::DoublePendulum);
    }

    #[test]
    fn reselecting_the_same_mode_keeps_history() {
        let mut state = LabState::with_mode(SimulationMode::DoublePendulum);
        state.energy_mut().push_at(1.0, EnergyReading::new(1.0, 1.0));
        state.set_simulation_mode(SimulationMode::DoublePendulum);
        assert_eq!(state.energy().len(), 1);
    }

    #[test]
    fn commands_route_to_the_matching_operation() {
        let mut state = LabState::new();
        state.apply(LabCommand::SetInteractionMode(InteractionMode::Add));
        let id = state.add_object(at(0.0, 0.0));

        state.apply(LabCommand::UpdateObjectMass { id, mass: 50.0 });
        assert_eq!(state.scene().get(id).map(|o| o.mass), Some(20.0));

        state.apply(LabCommand::TogglePause);
        assert!(state.settings().paused);
        state.apply(LabCommand::SetGravity(-1.5));
        assert_eq!(state.settings().gravity_y, -1.5);
        state.apply(LabCommand::SetMass1(4.0));
        state.apply(LabCommand::SetMass2(40.0));
        assert_eq!(state.settings().bob_masses(), [4.0, 10.0]);
        state.apply(LabCommand::ToggleTrails);
        assert!(!state.settings().show_trails);
        state.apply(LabCommand::SelectObject(Some(id)));
        assert_eq!(state.selected_object_id(), Some(id));
        state.apply(LabCommand::ClearScene);
        assert!(state.scene().is_empty());
        state.apply(LabCommand::Reset);
        assert!(!state.settings().paused);
    }

    #[test]
    fn random_mode_switching_preserves_invariants() {
        let mut rng = rand::rng();
        let modes = [
            InteractionMode::Select,
            InteractionMode::Add,
            InteractionMode::Force,
        ];
        let mut state = LabState::new();
        for _ in 0..500 {
            match rng.random_range(0..5) {
                0 => {
                    state.add_object(at(rng.random_range(-5.0..5.0), 0.0));
                }
                1 => {
                    let mode = modes[rng.random_range(0..modes.len())];
                    state.set_interaction_mode(mode);
                    if mode == InteractionMode::Add {
                        assert_eq!(state.selected_object_id(), None);
                    }
                }
                2 => {
                    let pick = state
                        .scene()
                        .objects()
                        .first()
                        .map(|object| object.id);
                    state.select_object(pick);
                }
                3 => {
                    if let Some(object) = state.scene().objects().last().copied() {
                        state.set_interaction_mode(InteractionMode::Force);
                        state
                            .interaction_mut()
                            .begin_gesture(object.id, object.position);
                    }
                }
                _ => state.clear_scene(),
            }
            state.debug_check();
            assert!(
                state.interaction().gesture().is_none()
                    || state.interaction_mode() == InteractionMode::Force
            );
        }
    }
}
