//! Instanced mesh rendering
//!
//! One unit mesh per [`MeshKind`] is uploaded at start-up. Each frame the
//! draw list's mesh instances are sorted into per-kind ranges of a single
//! instance buffer and drawn with one `draw_indexed` call per kind.

use std::ops::Range;

use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;
use crate::gfx::geometry::unit_mesh;
use crate::gfx::resources::DepthTarget;
use crate::scene::{MeshInstance, MeshKind};
use crate::wgpu_utils::GrowableBuffer;

const SHADER: &str = r#"
struct GlobalUniform {
    view_position: vec4<f32>,
    view_proj: mat4x4<f32>,
    light_direction: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: GlobalUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) emissive: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    var out: VertexOutput;
    out.clip_position = globals.view_proj * model * vec4<f32>(vertex.position, 1.0);
    out.normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.color = instance.color;
    out.emissive = instance.params.x;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let ambient = globals.light_direction.w;
    let diffuse = max(dot(n, globals.light_direction.xyz), 0.0);
    let lit = in.color.rgb * (ambient + (1.0 - ambient) * diffuse);
    let rgb = mix(lit, in.color.rgb, clamp(in.emissive, 0.0, 1.0));
    return vec4<f32>(rgb, in.color.a);
}
"#;

/// Per-instance data as laid out in the instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: emissive strength.
    pub params: [f32; 4],
}

impl InstanceData {
    pub fn from_instance(instance: &MeshInstance) -> Self {
        Self {
            model: instance.model.into(),
            color: instance.color,
            params: [instance.emissive, 0.0, 0.0, 0.0],
        }
    }

    pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Groups instances by kind in [`MeshKind::ALL`] order and returns the
/// instance range each kind occupies.
pub fn batch_instances(meshes: &[MeshInstance]) -> (Vec<InstanceData>, [Range<u32>; 3]) {
    let mut data = Vec::with_capacity(meshes.len());
    let mut ranges: [Range<u32>; 3] = Default::default();
    for (slot, kind) in MeshKind::ALL.into_iter().enumerate() {
        let start = data.len() as u32;
        data.extend(
            meshes
                .iter()
                .filter(|mesh| mesh.kind == kind)
                .map(InstanceData::from_instance),
        );
        ranges[slot] = start..data.len() as u32;
    }
    (data, ranges)
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, kind: MeshKind) -> Self {
        let data = unit_mesh(kind);
        let vertices = data.to_vertices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{kind:?} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{kind:?} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    meshes: [GpuMesh; 3],
    instances: GrowableBuffer<InstanceData>,
    ranges: [Range<u32>; 3],
}

impl MeshRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[globals_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc(), InstanceData::vertex_buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthTarget::depth_state(
                true,
                wgpu::CompareFunction::Less,
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            meshes: MeshKind::ALL.map(|kind| GpuMesh::new(device, kind)),
            instances: GrowableBuffer::new(device, "Mesh Instance Buffer", 256),
            ranges: Default::default(),
        }
    }

    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, meshes: &[MeshInstance]) {
        let (data, ranges) = batch_instances(meshes);
        self.instances.upload(device, queue, &data);
        self.ranges = ranges;
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.instances.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(1, self.instances.buffer().slice(..));

        for (mesh, range) in self.meshes.iter().zip(self.ranges.iter()) {
            if range.is_empty() {
                continue;
            }
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, range.clone());
        }
    }
}
