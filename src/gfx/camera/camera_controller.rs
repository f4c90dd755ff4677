use log::debug;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;

/// Pixel scroll deltas are divided by this to match line deltas.
const PIXELS_PER_LINE: f32 = 40.0;

const LEFT_BUTTON: u32 = 0;
const RIGHT_BUTTON: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrbitDrag {
    #[default]
    Idle,
    Orbit,
    Pan,
}

/// Scroll wheel delta in lines, positive when zooming in.
pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => *lines,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

/// Left drag orbits, right drag or shift-left drag pans, wheel zooms and
/// Shift+C returns to the launch view.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    drag: OrbitDrag,
    shift_held: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            drag: OrbitDrag::Idle,
            shift_held: false,
        }
    }

    pub fn drag(&self) -> OrbitDrag {
        self.drag
    }

    fn button(&mut self, button: u32, state: ElementState) {
        self.drag = match (state, button) {
            (ElementState::Released, _) => OrbitDrag::Idle,
            (ElementState::Pressed, LEFT_BUTTON) if self.shift_held => OrbitDrag::Pan,
            (ElementState::Pressed, LEFT_BUTTON) => OrbitDrag::Orbit,
            (ElementState::Pressed, RIGHT_BUTTON) => OrbitDrag::Pan,
            (ElementState::Pressed, _) => self.drag,
        };
    }

    fn motion(&self, delta: (f64, f64), camera: &mut OrbitCamera) -> bool {
        let (dx, dy) = (delta.0 as f32, delta.1 as f32);
        match self.drag {
            OrbitDrag::Idle => return false,
            OrbitDrag::Orbit => {
                camera.add_yaw(-dx * self.rotate_speed);
                camera.add_pitch(dy * self.rotate_speed);
            }
            OrbitDrag::Pan => camera.pan((-dx * self.pan_speed, dy * self.pan_speed)),
        }
        true
    }

    pub fn process_events(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut OrbitCamera,
    ) {
        let changed = match event {
            DeviceEvent::Button { button, state } => {
                self.button(*button, *state);
                false
            }
            DeviceEvent::MouseWheel { delta } => {
                camera.add_distance(-scroll_lines(delta) * self.zoom_speed);
                true
            }
            DeviceEvent::MouseMotion { delta } => self.motion(*delta, camera),
            _ => false,
        };
        if changed {
            window.request_redraw();
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match code {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                self.shift_held = event.state == ElementState::Pressed;
            }
            KeyCode::KeyC if event.state == ElementState::Pressed && self.shift_held => {
                debug!("camera reset");
                camera.reset_to_default();
            }
            _ => (),
        }
    }

    /// Drops a held drag, e.g. when a force gesture takes the pointer.
    pub fn release(&mut self) {
        self.drag = OrbitDrag::Idle;
    }
}
