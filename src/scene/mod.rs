//! Scene composition
//!
//! Builds the [`DrawList`] for a frame from the mounted preset and the
//! application state. Nothing here talks to the GPU; the renderer consumes
//! the list as-is.

pub mod draw_list;
pub mod palette;

use cgmath::Vector3;

use crate::simulation::SimulationManager;
use crate::state::{LabState, SimulationMode};

pub use draw_list::{DrawList, LineStrip, MeshInstance, MeshKind};

/// Half width of the drawn ground and grid.
pub const GROUND_EXTENT: f32 = 25.0;
pub const GRID_CELL_SIZE: f32 = 1.0;
/// Every n-th grid line is drawn as a section line.
pub const GRID_SECTION_EVERY: i32 = 5;
/// Lift above the ground surface to avoid z-fighting.
const GRID_LIFT: f32 = 0.002;

/// Composes everything visible this frame.
pub fn compose_frame(manager: &SimulationManager, state: &LabState) -> DrawList {
    let mut draw = DrawList::new();

    if manager.current_mode() == Some(SimulationMode::Sandbox) {
        draw.push_plane(Vector3::new(0.0, 0.0, 0.0), GROUND_EXTENT * 2.0, palette::GROUND);
        ground_grid(&mut draw, GROUND_EXTENT, GRID_CELL_SIZE);
    }

    manager.compose(state, &mut draw);

    if let Some((start, end)) = state.interaction().force_vector() {
        draw.push_line([start, end], palette::FORCE_ARROW);
    }

    draw
}

/// Square XZ grid of half width `extent` with section lines every
/// [`GRID_SECTION_EVERY`] cells.
pub fn ground_grid(draw: &mut DrawList, extent: f32, cell: f32) {
    if cell <= 0.0 || extent <= 0.0 {
        return;
    }
    let lines = (extent / cell).floor() as i32;
    for i in -lines..=lines {
        let offset = i as f32 * cell;
        let color = if i % GRID_SECTION_EVERY == 0 {
            palette::GRID_SECTION
        } else {
            palette::GRID_CELL
        };
        draw.push_line(
            [
                Vector3::new(offset, GRID_LIFT, -extent),
                Vector3::new(offset, GRID_LIFT, extent),
            ],
            color,
        );
        draw.push_line(
            [
                Vector3::new(-extent, GRID_LIFT, offset),
                Vector3::new(extent, GRID_LIFT, offset),
            ],
            color,
        );
    }
}
