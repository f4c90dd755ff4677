//! Interaction mode and the in-progress force gesture.

use cgmath::Vector3;

use crate::state::ObjectId;

/// Scales the drag vector of a force gesture into an impulse.
pub const FORCE_MULTIPLIER: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionMode {
    #[default]
    Select,
    Add,
    Force,
}

impl InteractionMode {
    pub fn label(self) -> &'static str {
        match self {
            InteractionMode::Select => "Select",
            InteractionMode::Add => "Add Particle",
            InteractionMode::Force => "Apply Force",
        }
    }
}

/// A drag started on a particle while in force mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceGesture {
    pub object: ObjectId,
    pub start_point: Vector3<f32>,
}

/// A gesture that has been released, ready to be turned into an impulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleasedGesture {
    pub object: ObjectId,
    pub start_point: Vector3<f32>,
    /// Last pointer position seen during the drag, if it ever moved.
    pub end_point: Option<Vector3<f32>>,
}

impl ReleasedGesture {
    pub fn impulse(&self) -> Option<Vector3<f32>> {
        self.end_point
            .map(|end| (end - self.start_point) * FORCE_MULTIPLIER)
    }
}

/// Current mode plus the gesture it may own.
///
/// Any mode change cancels the gesture, so a gesture only ever exists while
/// the mode is [`InteractionMode::Force`].
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    gesture: Option<ForceGesture>,
    pointer: Option<Vector3<f32>>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn gesture(&self) -> Option<&ForceGesture> {
        self.gesture.as_ref()
    }

    /// Start and current pointer positions of the active drag, for drawing
    /// the force arrow. `None` until the pointer has moved.
    pub fn force_vector(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let gesture = self.gesture.as_ref()?;
        self.pointer.map(|end| (gesture.start_point, end))
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.cancel_gesture();
    }

    /// Begins a gesture; ignored outside force mode.
    pub fn begin_gesture(&mut self, object: ObjectId, start_point: Vector3<f32>) -> bool {
        if self.mode != InteractionMode::Force {
            return false;
        }
        self.gesture = Some(ForceGesture {
            object,
            start_point,
        });
        self.pointer = None;
        true
    }

    /// Tracks the pointer during a drag. No-op without an active gesture.
    pub fn update_pointer(&mut self, point: Vector3<f32>) {
        if self.gesture.is_some() {
            self.pointer = Some(point);
        }
    }

    /// Ends the gesture and clears the visual vector.
    pub fn release_gesture(&mut self) -> Option<ReleasedGesture> {
        let end_point = self.pointer.take();
        self.gesture.take().map(|gesture| ReleasedGesture {
            object: gesture.object,
            start_point: gesture.start_point,
            end_point,
        })
    }

    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
        self.pointer = None;
    }

    pub(crate) fn debug_check(&self) {
        debug_assert!(
            self.gesture.is_none() || self.mode == InteractionMode::Force,
            "a force gesture can only exist in force mode"
        );
        debug_assert!(
            self.pointer.is_none() || self.gesture.is_some(),
            "the visual force vector needs a gesture"
        );
    }
}
