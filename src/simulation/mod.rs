//! Simulation presets and the manager that drives them.

pub mod energy;
pub mod geometry;
pub mod manager;
pub mod pendulum;
pub mod sandbox;
pub mod traits;

pub use manager::{preset_for, SimulationManager};
pub use pendulum::PendulumPreset;
pub use sandbox::SandboxPreset;
pub use traits::{Preset, PresetContext};
