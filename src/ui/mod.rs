//! # User Interface Module
//!
//! Dear ImGui overlay: the [`UiManager`] integration with winit and wgpu, the
//! controls [`panel`] and the energy [`chart`].
//!
//! The panel never mutates application state directly. It returns
//! [`LabCommand`](crate::state::LabCommand)s that the app applies after the
//! UI frame, so input capture and state changes stay in one place.

pub mod chart;
pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::controls_panel;
