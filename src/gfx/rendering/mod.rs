//! Core rendering functionality
//!
//! Handles render pipelines, GPU buffers and frame rendering.

pub mod line_renderer;
pub mod mesh_renderer;
pub mod render_engine;
pub mod vertex;

pub use render_engine::RenderEngine;
