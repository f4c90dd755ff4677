//! Pointer dispatch
//!
//! Turns picked pointer events into state transitions according to the
//! current interaction mode, and resolves released force gestures into
//! impulses on live bodies.

use cgmath::{InnerSpace, Vector2, Vector3};
use log::{debug, info};

use super::machine::InteractionMode;
use crate::physics::{BodyHandleRegistry, BodyKey, PhysicsBackend};
use crate::state::{LabState, PARTICLE_SPAWN_HEIGHT};

/// Movement in pixels beyond which a press/release pair is a drag, not a click.
pub const CLICK_SLOP: f32 = 4.0;

/// What the pointer ray hit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Body(BodyKey),
    /// The ground plane or empty space behind it.
    Empty,
}

/// A pick result: the target and the world-space intersection point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerHit {
    pub target: PickTarget,
    pub point: Vector3<f32>,
}

impl PointerHit {
    pub fn body(key: BodyKey, point: Vector3<f32>) -> Self {
        Self {
            target: PickTarget::Body(key),
            point,
        }
    }

    pub fn empty(point: Vector3<f32>) -> Self {
        Self {
            target: PickTarget::Empty,
            point,
        }
    }
}

/// Dispatches pointer events and owns pointer capture.
///
/// While captured, move and release events belong to the active force
/// gesture regardless of what is under the cursor, and camera input is
/// suppressed by the caller.
#[derive(Debug, Default)]
pub struct InteractionController {
    captured: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_capture(&self) -> bool {
        self.captured
    }

    /// Height of the horizontal plane drag positions are projected onto.
    pub fn drag_plane_height(&self, state: &LabState) -> Option<f32> {
        if !self.captured {
            return None;
        }
        state
            .interaction()
            .gesture()
            .map(|gesture| gesture.start_point.y)
    }

    /// Pointer pressed. Starts a force gesture when pressing a particle in
    /// force mode; returns whether the pointer is now captured.
    pub fn pointer_down(&mut self, hit: Option<PointerHit>, state: &mut LabState) -> bool {
        if state.interaction_mode() != InteractionMode::Force {
            return false;
        }
        let Some(PointerHit {
            target: PickTarget::Body(BodyKey::Object(id)),
            point,
        }) = hit
        else {
            return false;
        };
        if !state.scene().contains(id) {
            return false;
        }

        if state.interaction_mut().begin_gesture(id, point) {
            debug!("force gesture on {id} from {point:?}");
            self.captured = true;
        }
        state.debug_check();
        self.captured
    }

    /// Pointer moved to `point` (already projected onto the drag plane).
    /// Only updates the visual force vector.
    pub fn pointer_move(&mut self, point: Vector3<f32>, state: &mut LabState) {
        if self.captured {
            state.interaction_mut().update_pointer(point);
        }
    }

    /// Pointer released. Applies the gesture's impulse if its body is still
    /// registered; the gesture, visual vector and capture are cleared on
    /// every path. Returns the applied impulse.
    pub fn pointer_up(
        &mut self,
        point: Option<Vector3<f32>>,
        state: &mut LabState,
        registry: &BodyHandleRegistry,
        physics: &mut dyn PhysicsBackend,
    ) -> Option<Vector3<f32>> {
        let was_captured = std::mem::replace(&mut self.captured, false);
        if was_captured {
            if let Some(point) = point {
                state.interaction_mut().update_pointer(point);
            }
        }

        let released = state.interaction_mut().release_gesture()?;
        let impulse = released.impulse()?;

        match registry.get(BodyKey::Object(released.object)) {
            Some(handle) => {
                physics.apply_impulse(handle, impulse, true);
                info!(
                    "impulse ({:.2}, {:.2}, {:.2}) on {}",
                    impulse.x, impulse.y, impulse.z, released.object
                );
                Some(impulse)
            }
            None => {
                debug!("{} has no live body, dropping gesture", released.object);
                None
            }
        }
    }

    /// A press and release without dragging.
    pub fn click(&mut self, hit: Option<PointerHit>, state: &mut LabState) {
        let mode = state.interaction_mode();
        match hit {
            Some(PointerHit {
                target: PickTarget::Body(BodyKey::Object(id)),
                ..
            }) => {
                if mode != InteractionMode::Force {
                    state.select_object(Some(id));
                }
            }
            Some(PointerHit {
                target: PickTarget::Empty,
                point,
            }) if mode == InteractionMode::Add => {
                state.add_object(Vector3::new(point.x, PARTICLE_SPAWN_HEIGHT, point.z));
            }
            Some(_) | None => {
                if mode != InteractionMode::Add {
                    state.select_object(None);
                }
            }
        }
    }
}

/// Distinguishes clicks from drags on the primary button.
#[derive(Debug, Default)]
pub struct ClickTracker {
    pressed_at: Option<Vector2<f32>>,
    travelled: f32,
}

impl ClickTracker {
    pub fn press(&mut self, position: Vector2<f32>) {
        self.pressed_at = Some(position);
        self.travelled = 0.0;
    }

    pub fn moved(&mut self, position: Vector2<f32>) {
        if let Some(origin) = self.pressed_at {
            self.travelled = self.travelled.max((position - origin).magnitude());
        }
    }

    /// Ends the press; `true` if it qualifies as a click.
    pub fn release(&mut self, position: Vector2<f32>) -> bool {
        self.moved(position);
        let was_pressed = self.pressed_at.take().is_some();
        was_pressed && self.travelled <= CLICK_SLOP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mock::MockPhysics;
    use crate::physics::BodyDesc;
    use crate::state::ObjectId;

    fn force_ready(state: &mut LabState) -> ObjectId {
        let id = state.add_object(Vector3::new(0.0, 0.5, 0.0));
        state.set_interaction_mode(InteractionMode::Force);
        id
    }

    fn mounted(
        id: ObjectId,
        physics: &mut MockPhysics,
        registry: &mut BodyHandleRegistry,
    ) -> crate::physics::BodyHandle {
        let handle = physics.create_body(&BodyDesc::dynamic_ball(0.5, 1.0, Vector3::new(0.0, 1.0, 0.0)));
        registry.register(BodyKey::Object(id), handle);
        handle
    }

    #[test]
    fn force_drag_applies_scaled_impulse() {
        let mut state = LabState::new();
        let mut physics = MockPhysics::new();
        let mut registry = BodyHandleRegistry::new();
        let mut controller = InteractionController::new();
        let id = force_ready(&mut state);
        let handle = mounted(id, &mut physics, &mut registry);

        let down = PointerHit::body(BodyKey::Object(id), Vector3::new(0.0, 1.0, 0.0));
        assert!(controller.pointer_down(Some(down), &mut state));
        assert_eq!(controller.drag_plane_height(&state), Some(1.0));

        controller.pointer_move(Vector3::new(2.0, 1.0, 0.0), &mut state);
        assert_eq!(
            state.interaction().force_vector(),
            Some((Vector3::new(0.0, 1.0, 0.0), Vector3::new(2.0, 1.0, 0.0)))
        );

        let impulse = controller.pointer_up(None, &mut state, &registry, &mut physics);

        assert_eq!(impulse, Some(Vector3::new(10.0, 0.0, 0.0)));
        assert_eq!(physics.impulses, vec![(handle, Vector3::new(10.0, 0.0, 0.0))]);
        assert!(state.interaction().gesture().is_none());
        assert!(state.interaction().force_vector().is_none());
        assert!(!controller.has_capture());
    }

    #[test]
    fn release_position_counts_as_final_move() {
        let mut state = LabState::new();
        let mut physics = MockPhysics::new();
        let mut registry = BodyHandleRegistry::new();
        let mut controller = InteractionController::new();
        let id = force_ready(&mut state);
        mounted(id, &mut physics, &mut registry);

        controller.pointer_down(
            Some(PointerHit::body(BodyKey::Object(id), Vector3::new(0.0, 1.0, 0.0))),
            &mut state,
        );
        let impulse = controller.pointer_up(
            Some(Vector3::new(0.0, 1.0, -1.0)),
            &mut state,
            &registry,
            &mut physics,
        );
        assert_eq!(impulse, Some(Vector3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn missing_handle_is_a_silent_no_op() {
        let mut state = LabState::new();
        let mut physics = MockPhysics::new();
        let registry = BodyHandleRegistry::new();
        let mut controller = InteractionController::new();
        let id = force_ready(&mut state);

        controller.pointer_down(
            Some(PointerHit::body(BodyKey::Object(id), Vector3::new(0.0, 1.0, 0.0))),
            &mut state,
        );
        controller.pointer_move(Vector3::new(3.0, 1.0, 0.0), &mut state);
        let impulse = controller.pointer_up(None, &mut state, &registry, &mut physics);

        assert_eq!(impulse, None);
        assert!(physics.impulses.is_empty());
        assert!(state.interaction().gesture().is_none());
        assert!(state.interaction().force_vector().is_none());
        assert!(!controller.has_capture());
    }

    #[test]
    fn pointer_down_outside_force_mode_does_nothing() {
        let mut state = LabState::new();
        let mut controller = InteractionController::new();
        let id = state.add_object(Vector3::new(0.0, 0.5, 0.0));

        let hit = PointerHit::body(BodyKey::Object(id), Vector3::new(0.0, 1.0, 0.0));
        assert!(!controller.pointer_down(Some(hit), &mut state));
        assert!(state.interaction().gesture().is_none());
    }

    #[test]
    fn pointer_down_on_preset_bodies_is_ignored() {
        let mut state = LabState::new();
        let mut controller = InteractionController::new();
        state.set_interaction_mode(InteractionMode::Force);

        let hit = PointerHit::body(BodyKey::PendulumBob(0), Vector3::new(0.0, -3.0, 0.0));
        assert!(!controller.pointer_down(Some(hit), &mut state));
        assert!(!controller.has_capture());
    }

    #[test]
    fn click_on_empty_space_in_add_mode_places_a_particle() {
        let mut state = LabState::new();
        let mut controller = InteractionController::new();
        state.set_interaction_mode(InteractionMode::Add);

        controller.click(Some(PointerHit::empty(Vector3::new(3.0, -0.11, -2.0))), &mut state);

        let object = state.scene().objects()[0];
        assert_eq!(object.position, Vector3::new(3.0, PARTICLE_SPAWN_HEIGHT, -2.0));
        assert_eq!(state.interaction_mode(), InteractionMode::Select);
    }

    #[test]
    fn click_on_empty_space_deselects_and_returns_to_select() {
        for mode in [InteractionMode::Select, InteractionMode::Force] {
            let mut state = LabState::new();
            let mut controller = InteractionController::new();
            let id = state.add_object(Vector3::new(0.0, 0.5, 0.0));
            state.select_object(Some(id));
            state.set_interaction_mode(mode);

            controller.click(Some(PointerHit::empty(Vector3::new(1.0, 0.0, 1.0))), &mut state);

            assert_eq!(state.selected_object_id(), None);
            assert_eq!(state.interaction_mode(), InteractionMode::Select);
            assert_eq!(state.scene().len(), 1);
        }
    }

    #[test]
    fn click_on_particle_selects_it() {
        let mut state = LabState::new();
        let mut controller = InteractionController::new();
        let id = state.add_object(Vector3::new(0.0, 0.5, 0.0));

        controller.click(
            Some(PointerHit::body(BodyKey::Object(id), Vector3::new(0.0, 1.0, 0.0))),
            &mut state,
        );

        assert_eq!(state.selected_object_id(), Some(id));
        assert_eq!(state.interaction_mode(), InteractionMode::Select);
    }

    #[test]
    fn click_tracker_separates_clicks_from_drags() {
        let mut tracker = ClickTracker::default();
        tracker.press(Vector2::new(10.0, 10.0));
        tracker.moved(Vector2::new(12.0, 11.0));
        assert!(tracker.release(Vector2::new(11.0, 10.0)));

        tracker.press(Vector2::new(10.0, 10.0));
        tracker.moved(Vector2::new(40.0, 10.0));
        assert!(!tracker.release(Vector2::new(10.0, 10.0)));

        assert!(!tracker.release(Vector2::new(10.0, 10.0)));
    }
}
