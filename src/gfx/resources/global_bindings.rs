//! Per-frame global uniforms shared by every pipeline.
//!
//! Bound at group 0: camera matrices plus a single directional light.

use crate::{
    gfx::camera::CameraUniform,
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// MUST match the `GlobalUniform` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// xyz: direction towards the light, w: ambient term.
    light_direction: [f32; 4],
}

/// Directional light used for simple Lambert shading.
#[derive(Copy, Clone, Debug)]
pub struct LightConfig {
    pub direction: [f32; 3],
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [0.4, 1.0, 0.6],
            ambient: 0.35,
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: LightConfig,
) {
    let [x, y, z] = light.direction;
    let length = (x * x + y * y + z * z).sqrt().max(f32::EPSILON);
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        light_direction: [x / length, y / length, z / length, light.ambient],
    };
    ubo.update_content(queue, content);
}

pub struct GlobalBindings {
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self { layout, bind_group }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
