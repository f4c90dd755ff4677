//! WGPU helpers shared by the renderers.

pub mod binding_types;
pub mod growable_buffer;
pub mod uniform_buffer;

pub use growable_buffer::GrowableBuffer;
pub use uniform_buffer::UniformBuffer;
