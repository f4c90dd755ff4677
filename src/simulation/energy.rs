//! Energy derivation and the fixed-cadence sampling timer.

use cgmath::{InnerSpace, Vector3};
use std::time::Duration;

use crate::state::EnergyReading;

/// How often the fast energy buffer is copied into the history.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Mass, position and velocity of one body at the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySample {
    pub mass: f32,
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
}

/// Sum of `0.5 * m * |v|^2`.
pub fn kinetic_energy(bodies: &[BodySample]) -> f32 {
    bodies
        .iter()
        .map(|body| 0.5 * body.mass * body.velocity.magnitude2())
        .sum()
}

/// Sum of `m * (-g) * y`, heights measured from the world origin.
pub fn potential_energy(bodies: &[BodySample], gravity_y: f32) -> f32 {
    bodies
        .iter()
        .map(|body| body.mass * -gravity_y * body.position.y)
        .sum()
}

pub fn derive_energy(bodies: &[BodySample], gravity_y: f32) -> EnergyReading {
    EnergyReading::new(kinetic_energy(bodies), potential_energy(bodies, gravity_y))
}

/// Wall-clock driven timer that fires once per interval.
///
/// Driven by elapsed frame time rather than frame count. A long stall fires
/// once and drops the backlog instead of bursting.
#[derive(Debug, Clone)]
pub struct SampleCadence {
    interval: Duration,
    elapsed: Duration,
}

impl SampleCadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the timer; returns `true` when a sample is due.
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.elapsed += delta;
        if self.elapsed < self.interval {
            return false;
        }
        let interval = self.interval.as_nanos();
        let remainder = self.elapsed.as_nanos() % interval;
        self.elapsed = Duration::from_nanos(remainder as u64);
        true
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

impl Default for SampleCadence {
    fn default() -> Self {
        Self::new(SAMPLE_INTERVAL)
    }
}
