//! Preset lifecycle
//!
//! A preset is one mountable scene (the particle sandbox, the double
//! pendulum). The manager drives it through a fixed sequence each frame:
//! events are applied to [`LabState`] first, then [`Preset::commit`]
//! reconciles physics bodies with the stores, the world steps, and finally
//! [`Preset::frame`] and [`Preset::compose`] read the results.

use std::time::Duration;

use crate::physics::{BodyHandleRegistry, PhysicsBackend};
use crate::scene::DrawList;
use crate::state::{LabState, SimulationMode};

/// Mutable access to the physics world and the handle registry.
///
/// Only handed out during mount, commit and unmount; the per-frame read path
/// gets shared references.
pub struct PresetContext<'a> {
    pub physics: &'a mut dyn PhysicsBackend,
    pub registry: &'a mut BodyHandleRegistry,
}

pub trait Preset {
    fn mode(&self) -> SimulationMode;

    fn name(&self) -> &str;

    /// Creates the preset's bodies and registers their handles.
    fn mount(&mut self, ctx: &mut PresetContext<'_>, state: &mut LabState);

    /// Brings live bodies in line with the stores after events were applied.
    fn commit(&mut self, _ctx: &mut PresetContext<'_>, _state: &LabState) {}

    /// Per-frame read of body transforms after the physics step.
    fn frame(
        &mut self,
        _elapsed: Duration,
        _physics: &dyn PhysicsBackend,
        _registry: &BodyHandleRegistry,
        _state: &mut LabState,
    ) {
    }

    fn compose(
        &self,
        physics: &dyn PhysicsBackend,
        registry: &BodyHandleRegistry,
        state: &LabState,
        draw: &mut DrawList,
    );

    /// Removes every body created by the preset and unregisters it.
    fn unmount(&mut self, ctx: &mut PresetContext<'_>, state: &mut LabState);
}
