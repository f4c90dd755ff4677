//! GPU resources shared across pipelines.

pub mod depth_target;
pub mod global_bindings;

pub use depth_target::DepthTarget;
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig};
