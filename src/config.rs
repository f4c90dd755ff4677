//! Launch configuration.
//!
//! Read once at start-up from an optional TOML file; every field has a
//! default so a partial file (or none at all) is fine. Runtime-adjustable
//! values such as gravity and masses are not configured here.

use std::fs;
use std::path::Path;

use cgmath::{Deg, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::LabError;
use crate::simulation::manager::{DEFAULT_FIXED_TIMESTEP, DEFAULT_MAX_SUBSTEPS};
use crate::state::SimulationMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            title: "Virtual Physics Lab: Sandbox".to_string(),
            vsync: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Seconds per physics step.
    pub fixed_timestep: f32,
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 5.0, 15.0],
            target: [0.0, 0.0, 0.0],
            fovy: 50.0,
        }
    }
}

impl CameraConfig {
    pub fn eye(&self) -> Vector3<f32> {
        self.eye.into()
    }

    pub fn target(&self) -> Vector3<f32> {
        self.target.into()
    }

    pub fn fovy(&self) -> Deg<f32> {
        Deg(self.fovy)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub preset: SimulationMode,
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
}

impl LabConfig {
    pub fn load(path: &Path) -> Result<Self, LabError> {
        let text = fs::read_to_string(path).map_err(|source| LabError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| LabError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: LabConfig = toml::from_str(text)?;
        config.sanitize();
        Ok(config)
    }

    /// Replaces values the frame loop cannot work with.
    fn sanitize(&mut self) {
        let defaults = PhysicsConfig::default();
        if !(self.physics.fixed_timestep.is_finite() && self.physics.fixed_timestep > 0.0) {
            log::warn!(
                "invalid fixed_timestep {}, using {}",
                self.physics.fixed_timestep,
                defaults.fixed_timestep
            );
            self.physics.fixed_timestep = defaults.fixed_timestep;
        }
        self.physics.max_substeps = self.physics.max_substeps.max(1);
        self.window.width = self.window.width.max(1);
        self.window.height = self.window.height.max(1);
        self.camera.fovy = self.camera.fovy.clamp(1.0, 179.0);
    }
}
