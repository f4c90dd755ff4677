//! Application shell
//!
//! Owns the window, the GPU and UI managers, the camera and the lab itself,
//! and runs one frame per redraw:
//! UI commands, then simulation sync and stepping, scene composition, and
//! rendering.

use cgmath::Vector2;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::LabConfig;
use crate::error::LabError;
use crate::gfx::{
    camera::{CameraController, CameraManager, OrbitCamera},
    picking::{self, Ray},
    RenderEngine,
};
use crate::interaction::{ClickTracker, InteractionController, PointerHit};
use crate::physics::RapierWorld;
use crate::scene;
use crate::simulation::SimulationManager;
use crate::state::LabState;
use crate::ui::{controls_panel, UiManager};

type UiPass = fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView);

pub struct LabApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: LabConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    camera_manager: CameraManager,
    lab: LabState,
    simulation: SimulationManager,
    controller: InteractionController,
    clicks: ClickTracker,
    cursor: Option<Vector2<f32>>,
    last_frame: Instant,
    fatal: Option<LabError>,
}

impl LabApp {
    pub fn new(config: LabConfig) -> Result<Self, LabError> {
        let event_loop = EventLoop::new()?;

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera = OrbitCamera::looking_at(
            config.camera.eye(),
            config.camera.target(),
            config.camera.fovy(),
            aspect,
        );
        let controller = CameraController::new(0.005, 0.1);

        let lab = LabState::with_mode(config.preset);
        let physics = RapierWorld::new(lab.settings().gravity());
        let simulation = SimulationManager::new(Box::new(physics))
            .with_timestep(config.physics.fixed_timestep, config.physics.max_substeps);

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                camera_manager: CameraManager::new(camera, controller),
                lab,
                simulation,
                controller: InteractionController::new(),
                clicks: ClickTracker::default(),
                cursor: None,
                last_frame: Instant::now(),
                fatal: None,
            },
        })
    }

    /// Runs the event loop until the window closes.
    pub fn run(self) -> Result<(), LabError> {
        let Self {
            event_loop,
            mut app_state,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut app_state)?;

        match app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: LabError) {
        log::error!("{err}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), LabError> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let (width, height) = window.inner_size().into();

        let surface_target = window.clone();
        let vsync = self.config.window.vsync;
        let renderer = pollster::block_on(RenderEngine::new(surface_target, width, height, vsync))?;

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );

        self.camera_manager.resize(width, height);
        log::info!("window ready at {width}x{height}");

        self.window = Some(window);
        self.render_engine = Some(renderer);
        self.ui_manager = Some(ui_manager);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn cursor_ray(&self) -> Option<Ray> {
        let cursor = self.cursor?;
        let (width, height) = self.render_engine.as_ref()?.get_surface_size();
        Some(picking::screen_to_ray(
            (cursor.x, cursor.y),
            (width as f32, height as f32),
            &self.camera_manager.camera,
        ))
    }

    fn pick_under_cursor(&self) -> Option<PointerHit> {
        let ray = self.cursor_ray()?;
        let targets = picking::particle_targets(&self.simulation, &self.lab);
        picking::pick(&ray, &targets, picking::ground_height(&self.simulation))
    }

    /// Cursor projected onto the active gesture's drag plane.
    fn drag_point(&self) -> Option<cgmath::Vector3<f32>> {
        let height = self.controller.drag_plane_height(&self.lab)?;
        let ray = self.cursor_ray()?;
        ray.intersect_plane_y(height).map(|t| ray.point_at(t))
    }

    fn pointer_pressed(&mut self) {
        if let Some(cursor) = self.cursor {
            self.clicks.press(cursor);
        }
        let hit = self.pick_under_cursor();
        if self.controller.pointer_down(hit, &mut self.lab) {
            self.camera_manager.controller.release();
        }
    }

    fn pointer_released(&mut self) {
        let was_click = self
            .cursor
            .map(|cursor| self.clicks.release(cursor))
            .unwrap_or(false);

        if self.controller.has_capture() {
            self.release_capture();
        } else if was_click {
            let hit = self.pick_under_cursor();
            self.controller.click(hit, &mut self.lab);
        }
    }

    /// Ends pointer capture, resolving the gesture against the live body.
    fn release_capture(&mut self) {
        let point = self.drag_point();
        let (physics, registry) = self.simulation.world_mut();
        self.controller
            .pointer_up(point, &mut self.lab, registry, physics);
        self.camera_manager.controller.release();
    }

    fn frame(&mut self) -> Result<(), LabError> {
        let (Some(window), Some(render_engine)) = (self.window.as_ref(), self.render_engine.as_mut())
        else {
            return Ok(());
        };

        let commands = match self.ui_manager.as_mut() {
            Some(ui_manager) => ui_manager.build(window, |ui| controls_panel(ui, &self.lab)),
            None => Vec::new(),
        };
        for command in commands {
            self.lab.apply(command);
        }

        let now = Instant::now();
        let elapsed = now - self.last_frame;
        self.last_frame = now;

        self.simulation.sync(&mut self.lab);
        self.simulation.update(elapsed, &mut self.lab);
        self.lab.debug_check();

        let draw = scene::compose_frame(&self.simulation, &self.lab);

        let camera = &mut self.camera_manager.camera;
        camera.update_view_proj();
        render_engine.update(camera.uniform);

        match self.ui_manager.as_mut() {
            Some(ui_manager) => render_engine.render_frame(
                &draw,
                Some(|device: &wgpu::Device,
                      queue: &wgpu::Queue,
                      encoder: &mut wgpu::CommandEncoder,
                      view: &wgpu::TextureView| {
                    ui_manager.render_overlay(device, queue, encoder, view);
                }),
            ),
            None => render_engine.render_frame(&draw, None::<UiPass>),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init_graphics(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // The UI sees input first; while a force gesture holds the pointer
        // the scene keeps receiving it regardless.
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let claimed = ui_manager.handle_window_event(&window, window_id, &event);
            if claimed && !self.controller.has_capture() {
                if let WindowEvent::MouseInput {
                    state: ElementState::Released,
                    button: MouseButton::Left,
                    ..
                } = event
                {
                    if let Some(cursor) = self.cursor {
                        self.clicks.release(cursor);
                    }
                }
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if key_event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && key_event.state == ElementState::Pressed
                {
                    event_loop.exit();
                    return;
                }
                self.camera_manager.process_keyboard_event(&key_event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vector2::new(position.x as f32, position.y as f32);
                self.cursor = Some(cursor);
                self.clicks.moved(cursor);
                if self.controller.has_capture() {
                    if let Some(point) = self.drag_point() {
                        self.controller.pointer_move(point, &mut self.lab);
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.pointer_pressed(),
                ElementState::Released => self.pointer_released(),
            },
            WindowEvent::Focused(false) | WindowEvent::CursorLeft { .. } => {
                if self.controller.has_capture() {
                    log::debug!("pointer lost during gesture");
                    self.release_capture();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.camera_manager.resize(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.frame() {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        if self.controller.has_capture() {
            return;
        }
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_mouse() {
                return;
            }
        }

        self.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
