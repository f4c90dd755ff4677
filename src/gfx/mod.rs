//! # Graphics Module
//!
//! Everything between a [`DrawList`](crate::scene::DrawList) and pixels on
//! screen, plus the inverse direction for pointer picking.
//!
//! - **Camera** ([`camera`]) - Orbit camera with drag, pan and zoom controls
//! - **Geometry** ([`geometry`]) - Unit sphere, cylinder and plane meshes
//! - **Picking** ([`picking`]) - Cursor rays against bodies and the ground
//! - **Rendering** ([`rendering`]) - Instanced mesh and line passes
//! - **Resources** ([`resources`]) - Global uniforms and depth textures

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;

pub use camera::OrbitCamera;
pub use rendering::RenderEngine;
