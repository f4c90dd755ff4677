//! physlab
//!
//! An interactive rigid-body physics lab: a sandbox for placing and pushing
//! particles, and a double pendulum with live energy charting. Built on
//! wgpu, winit, imgui and rapier.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod interaction;
pub mod physics;
pub mod scene;
pub mod simulation;
pub mod state;
pub mod ui;
pub mod wgpu_utils;

pub use app::LabApp;
pub use config::LabConfig;
pub use error::{LabError, LabResult};
pub use state::{LabCommand, LabState};
