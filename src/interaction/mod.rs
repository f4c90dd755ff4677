//! Interaction state machine and pointer dispatch.

pub mod controller;
pub mod machine;

pub use controller::{ClickTracker, InteractionController, PickTarget, PointerHit, CLICK_SLOP};
pub use machine::{ForceGesture, InteractionMode, InteractionState, ReleasedGesture, FORCE_MULTIPLIER};
