//! WGPU-based rendering engine
//!
//! Owns the surface, device and queue, and draws a [`DrawList`] with the mesh
//! and line renderers followed by an optional UI overlay.

use wgpu::TextureFormat;

use super::{line_renderer::LineRenderer, mesh_renderer::MeshRenderer};
use crate::error::LabError;
use crate::gfx::{
    camera::CameraUniform,
    resources::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig, DepthTarget},
};
use crate::scene::{palette, DrawList};

/// Surface, device and the two scene renderers.
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_target: DepthTarget,
    format: TextureFormat,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    light_config: LightConfig,
    mesh_renderer: MeshRenderer,
    line_renderer: LineRenderer,
}

impl RenderEngine {
    /// Fails when no surface, adapter, device or usable format is available.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, LabError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = pick_format(&capabilities.formats).ok_or(LabError::NoSurfaceFormat)?;
        let present_mode = pick_present_mode(vsync, &capabilities.present_modes);
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("surface format {format:?}, present mode {present_mode:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_target = DepthTarget::new(&device, config.width, config.height);

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let mesh_renderer = MeshRenderer::new(&device, format, global_bindings.layout());
        let line_renderer = LineRenderer::new(&device, format, global_bindings.layout());

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_target,
            format,
            global_ubo,
            global_bindings,
            light_config: LightConfig::default(),
            mesh_renderer,
            line_renderer,
        })
    }

    /// Draws `draw`, then hands the encoder to `ui_callback` for the overlay.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; a
    /// timeout skips the frame. Anything else is returned to the caller.
    pub fn render_frame<F>(&mut self, draw: &DrawList, ui_callback: Option<F>) -> Result<(), LabError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface texture timed out, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.mesh_renderer
            .prepare(&self.device, &self.queue, &draw.meshes);
        self.line_renderer
            .prepare(&self.device, &self.queue, &draw.lines);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(palette::BACKGROUND)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_target.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
            self.mesh_renderer.render(&mut render_pass);
            self.line_renderer.render(&mut render_pass);
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Updates camera and light uniform buffers. Call once per frame.
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            camera_uniform,
            self.light_config,
        );
    }

    /// Resizes the surface and recreates the depth buffer. Zero sizes are
    /// ignored (minimised windows).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_target.resize(&self.device, width, height);
    }

    /// Returns current surface dimensions as (width, height) in pixels.
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Prefers a linear format; colours in the palette are already sRGB-encoded.
fn pick_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first().copied())
}

/// `Fifo` when vsync is on; otherwise the lowest-latency mode the surface
/// offers. `Fifo` is always supported.
fn pick_present_mode(vsync: bool, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

fn clear_color([r, g, b, a]: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::PresentMode;

    #[test]
    fn linear_formats_win_over_srgb() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(pick_format(&formats), Some(TextureFormat::Bgra8Unorm));
        assert_eq!(
            pick_format(&[TextureFormat::Rgba8UnormSrgb]),
            Some(TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(pick_format(&[]), None);
    }

    #[test]
    fn present_mode_follows_vsync_and_support() {
        let all = [PresentMode::Fifo, PresentMode::Mailbox, PresentMode::Immediate];
        assert_eq!(pick_present_mode(true, &all), PresentMode::Fifo);
        assert_eq!(pick_present_mode(false, &all), PresentMode::Immediate);
        assert_eq!(
            pick_present_mode(false, &[PresentMode::Fifo, PresentMode::Mailbox]),
            PresentMode::Mailbox
        );
        assert_eq!(pick_present_mode(false, &[PresentMode::Fifo]), PresentMode::Fifo);
    }

    #[test]
    fn clear_color_widens_channels() {
        let color = clear_color([0.5, 0.25, 0.0, 1.0]);
        assert_eq!((color.r, color.g, color.b, color.a), (0.5, 0.25, 0.0, 1.0));
    }
}
