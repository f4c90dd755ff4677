//! Runtime simulation settings driven by the control panel.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

pub const DEFAULT_GRAVITY_Y: f32 = -9.81;
pub const DEFAULT_BOB_MASS: f32 = 1.0;

pub const GRAVITY_RANGE: RangeInclusive<f32> = -20.0..=0.0;
pub const PARTICLE_MASS_RANGE: RangeInclusive<f32> = 0.1..=20.0;
pub const BOB_MASS_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Which preset scene is mounted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    #[default]
    Sandbox,
    DoublePendulum,
}

impl SimulationMode {
    pub const ALL: [SimulationMode; 2] = [SimulationMode::Sandbox, SimulationMode::DoublePendulum];

    pub fn label(self) -> &'static str {
        match self {
            SimulationMode::Sandbox => "Sandbox",
            SimulationMode::DoublePendulum => "Double Pendulum",
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Global simulation configuration, one instance per application.
///
/// Read every frame and forwarded to the physics engine's gravity and pause
/// controls. Setters clamp to the same ranges the sliders use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSettings {
    pub gravity_y: f32,
    pub paused: bool,
    pub mode: SimulationMode,
    pub mass1: f32,
    pub mass2: f32,
    pub show_trails: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            gravity_y: DEFAULT_GRAVITY_Y,
            paused: false,
            mode: SimulationMode::Sandbox,
            mass1: DEFAULT_BOB_MASS,
            mass2: DEFAULT_BOB_MASS,
            show_trails: true,
        }
    }
}

impl SimulationSettings {
    pub fn gravity(&self) -> Vector3<f32> {
        Vector3::new(0.0, self.gravity_y, 0.0)
    }

    pub fn set_gravity_y(&mut self, gravity_y: f32) {
        self.gravity_y = clamp_to(gravity_y, &GRAVITY_RANGE);
    }

    pub fn set_mass1(&mut self, mass: f32) {
        self.mass1 = clamp_to(mass, &BOB_MASS_RANGE);
    }

    pub fn set_mass2(&mut self, mass: f32) {
        self.mass2 = clamp_to(mass, &BOB_MASS_RANGE);
    }

    pub fn bob_masses(&self) -> [f32; 2] {
        [self.mass1, self.mass2]
    }
}

/// Clamps `value` into `range`, mapping NaN to the lower bound.
pub fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
