//! ImGui integration
//!
//! Owns the imgui context together with its winit platform and wgpu
//! renderer. The app builds one UI frame per redraw with [`UiManager::build`]
//! and draws it over the scene with [`UiManager::render_overlay`].

use imgui::{Context, FontConfig, FontSource, MouseCursor, Style, StyleColor, Ui};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

use crate::scene::palette::hex;

const FONT_SIZE: f32 = 18.0;

/// Dark slate panel with rounded controls.
fn apply_theme(style: &mut Style) {
    style.window_rounding = 8.0;
    style.frame_rounding = 4.0;
    style.grab_rounding = 4.0;
    style.window_padding = [12.0, 12.0];
    style.item_spacing = [8.0, 8.0];

    style[StyleColor::WindowBg] = with_alpha(hex(0x1e293b), 0.92);
    style[StyleColor::TitleBg] = hex(0x0f172a);
    style[StyleColor::TitleBgActive] = hex(0x1e3a8a);
    style[StyleColor::FrameBg] = hex(0x334155);
    style[StyleColor::FrameBgHovered] = hex(0x475569);
    style[StyleColor::SliderGrab] = hex(0x60a5fa);
    style[StyleColor::SliderGrabActive] = hex(0x93c5fd);
    style[StyleColor::Separator] = hex(0x475569);
}

fn with_alpha(mut color: [f32; 4], alpha: f32) -> [f32; 4] {
    color[3] = alpha;
    color
}

pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    pub fn new(device: &Device, queue: &Queue, format: TextureFormat, window: &Window) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);
        apply_theme(context.style_mut());

        // DPI locked to 1.0 keeps the panel in physical pixels, like picking.
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE,
                ..Default::default()
            }),
        }]);

        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: format,
                ..Default::default()
            },
        );

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Forwards pointer, keyboard and focus events to imgui. Returns true
    /// when the panel claims the event and the scene should not see it.
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        window_id: WindowId,
        event: &WindowEvent,
    ) -> bool {
        let forwarded = matches!(
            event,
            WindowEvent::CursorMoved { .. }
                | WindowEvent::MouseInput { .. }
                | WindowEvent::MouseWheel { .. }
                | WindowEvent::KeyboardInput { .. }
                | WindowEvent::ModifiersChanged(_)
                | WindowEvent::Focused(_)
        );
        if !forwarded {
            return false;
        }

        let wrapped: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform
            .handle_event(self.context.io_mut(), window, &wrapped);

        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    pub fn wants_mouse(&self) -> bool {
        self.context.io().want_capture_mouse
    }

    /// Builds this frame's UI and returns whatever `build` produced.
    pub fn build<R>(&mut self, window: &Window, build: impl FnOnce(&Ui) -> R) -> R {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(err) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("failed to prepare ui frame: {err}");
        }

        let ui = &*self.context.frame();
        let output = build(ui);

        let cursor = ui.mouse_cursor();
        if self.last_cursor != cursor {
            self.last_cursor = cursor;
            self.platform.prepare_render(ui, window);
        }
        output
    }

    /// Draws the frame from the last [`build`](Self::build) over `target`.
    pub fn render_overlay(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
    ) {
        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ui_overlay_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(err) = self.renderer.render(draw_data, queue, device, &mut pass) {
            log::warn!("failed to render ui: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_replaces_only_the_last_channel() {
        let color = with_alpha([0.1, 0.2, 0.3, 1.0], 0.5);
        assert_eq!(color, [0.1, 0.2, 0.3, 0.5]);
    }
}
