//! Energy history store
//!
//! Bounded time series of energy samples shown by the chart. The sampling
//! cadence is owned by whoever feeds the store; the store only stamps and
//! bounds.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of samples retained; older samples fall off the front.
pub const MAX_ENERGY_HISTORY: usize = 200;

/// Instantaneous kinetic and potential energy of a system.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyReading {
    pub kinetic: f32,
    pub potential: f32,
}

impl EnergyReading {
    pub fn new(kinetic: f32, potential: f32) -> Self {
        Self { kinetic, potential }
    }

    pub fn total(&self) -> f32 {
        self.kinetic + self.potential
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyDataPoint {
    /// Wall-clock time in seconds since the Unix epoch.
    pub time: f64,
    pub kinetic_energy: f32,
    pub potential_energy: f32,
    pub total_energy: f32,
}

#[derive(Debug, Clone)]
pub struct EnergyHistory {
    points: VecDeque<EnergyDataPoint>,
    capacity: usize,
}

impl EnergyHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENERGY_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Stamps `reading` with the current wall-clock time and appends it.
    pub fn add_energy_data_point(&mut self, reading: EnergyReading) {
        self.push_at(wall_clock_seconds(), reading);
    }

    pub fn push_at(&mut self, time: f64, reading: EnergyReading) {
        self.points.push_back(EnergyDataPoint {
            time,
            kinetic_energy: reading.kinetic,
            potential_energy: reading.potential,
            total_energy: reading.total(),
        });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn clear_history(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &EnergyDataPoint> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&EnergyDataPoint> {
        self.points.back()
    }
}

impl Default for EnergyHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn wall_clock_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_kinetic_plus_potential() {
        let mut history = EnergyHistory::new();
        history.push_at(1.0, EnergyReading::new(2.0, -5.0));
        let point = history.latest().copied().unwrap();
        assert_eq!(point.total_energy, -3.0);
        assert_eq!(point.time, 1.0);
    }

    #[test]
    fn keeps_only_the_most_recent_samples() {
        let mut history = EnergyHistory::new();
        for i in 0..250 {
            history.push_at(i as f64, EnergyReading::new(i as f32, 0.0));
        }

        assert_eq!(history.len(), MAX_ENERGY_HISTORY);
        let times: Vec<f64> = history.iter().map(|p| p.time).collect();
        assert_eq!(times.first().copied(), Some(50.0));
        assert_eq!(times.last().copied(), Some(249.0));
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn live_samples_are_stamped_in_order() {
        let mut history = EnergyHistory::new();
        history.add_energy_data_point(EnergyReading::new(1.0, 1.0));
        history.add_energy_data_point(EnergyReading::new(1.0, 1.0));
        let times: Vec<f64> = history.iter().map(|p| p.time).collect();
        assert!(times[0] > 0.0);
        assert!(times[0] <= times[1]);
    }

    #[test]
    fn clear_empties_the_series() {
        let mut history = EnergyHistory::with_capacity(4);
        history.push_at(0.0, EnergyReading::default());
        history.clear_history();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 4);
    }
}
