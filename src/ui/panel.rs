//! The controls panel.
//!
//! Reads [`LabState`] and returns the [`LabCommand`]s the user triggered this
//! frame; the caller applies them after the UI frame is built.

use imgui::{Condition, StyleColor, Ui};

use super::chart;
use crate::interaction::InteractionMode;
use crate::scene::palette::hex;
use crate::state::settings::{BOB_MASS_RANGE, GRAVITY_RANGE, PARTICLE_MASS_RANGE};
use crate::state::{LabCommand, LabState, SimulationMode};

const PANEL_WIDTH: f32 = 340.0;
const ACTIVE_TOOL: [f32; 4] = hex(0xca8a04);
const FORCE_TOOL: [f32; 4] = hex(0x2563eb);
const ADD_TOOL: [f32; 4] = hex(0x16a34a);
const CLEAR_TOOL: [f32; 4] = hex(0xdc2626);

/// Snaps a slider value to one decimal place.
pub fn snap_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

pub fn controls_panel(ui: &Ui, state: &LabState) -> Vec<LabCommand> {
    let mut commands = Vec::new();
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return commands;
    }

    ui.window("Virtual Physics Lab")
        .size([PANEL_WIDTH, display_size[1] - 40.0], Condition::FirstUseEver)
        .position([20.0, 20.0], Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            preset_selector(ui, state, &mut commands);
            ui.separator();
            general_controls(ui, state, &mut commands);
            ui.separator();
            interaction_tools(ui, state, &mut commands);

            match state.settings().mode {
                SimulationMode::Sandbox => sandbox_tools(ui, state, &mut commands),
                SimulationMode::DoublePendulum => pendulum_controls(ui, state, &mut commands),
            }
        });

    commands
}

fn preset_selector(ui: &Ui, state: &LabState, commands: &mut Vec<LabCommand>) {
    ui.text("Simulation Preset");
    let labels = SimulationMode::ALL.map(SimulationMode::label);
    let mut index = SimulationMode::ALL
        .iter()
        .position(|mode| *mode == state.settings().mode)
        .unwrap_or(0);
    if ui.combo_simple_string("##preset", &mut index, &labels[..]) {
        if let Some(mode) = SimulationMode::ALL.get(index) {
            commands.push(LabCommand::SetSimulationMode(*mode));
        }
    }
}

fn general_controls(ui: &Ui, state: &LabState, commands: &mut Vec<LabCommand>) {
    let settings = state.settings();
    ui.text("General Controls");

    let mut gravity = settings.gravity_y;
    if ui
        .slider_config("Gravity (Y-axis)", *GRAVITY_RANGE.start(), *GRAVITY_RANGE.end())
        .display_format("%.2f")
        .build(&mut gravity)
    {
        commands.push(LabCommand::SetGravity(snap_tenth(gravity)));
    }

    let pause_label = if settings.paused { "Resume" } else { "Pause" };
    if ui.button(pause_label) {
        commands.push(LabCommand::TogglePause);
    }
    ui.same_line();
    if ui.button("Reset App") {
        commands.push(LabCommand::Reset);
    }
}

fn interaction_tools(ui: &Ui, state: &LabState, commands: &mut Vec<LabCommand>) {
    ui.text("Interaction Tools");
    let active = state.interaction_mode() == InteractionMode::Force;
    let label = if active {
        "Click & drag an object..."
    } else {
        "Apply Force"
    };
    if tool_button(ui, label, FORCE_TOOL, active) {
        commands.push(LabCommand::SetInteractionMode(InteractionMode::Force));
    }
}

fn sandbox_tools(ui: &Ui, state: &LabState, commands: &mut Vec<LabCommand>) {
    ui.separator();
    ui.text("Sandbox Tools");

    let adding = state.interaction_mode() == InteractionMode::Add;
    let label = if adding {
        "Click on scene to place..."
    } else {
        "Add Particle"
    };
    if tool_button(ui, label, ADD_TOOL, adding) {
        commands.push(LabCommand::SetInteractionMode(InteractionMode::Add));
    }
    if tool_button(ui, "Clear Scene", CLEAR_TOOL, false) {
        commands.push(LabCommand::ClearScene);
    }
    ui.text(format!("Particles: {}", state.scene().len()));

    let Some(selected) = state.scene().selected_object() else {
        return;
    };

    ui.separator();
    ui.text("Selected Particle Properties");
    let mut mass = selected.mass;
    if ui
        .slider_config("Mass", *PARTICLE_MASS_RANGE.start(), *PARTICLE_MASS_RANGE.end())
        .display_format("%.2f")
        .build(&mut mass)
    {
        commands.push(LabCommand::UpdateObjectMass {
            id: selected.id,
            mass: snap_tenth(mass),
        });
    }
    if ui.button("Deselect") {
        commands.push(LabCommand::SelectObject(None));
    }
}

fn pendulum_controls(ui: &Ui, state: &LabState, commands: &mut Vec<LabCommand>) {
    let settings = state.settings();
    ui.separator();
    ui.text("Pendulum Properties");

    let (min, max) = (*BOB_MASS_RANGE.start(), *BOB_MASS_RANGE.end());
    let mut mass1 = settings.mass1;
    if ui
        .slider_config("Mass 1", min, max)
        .display_format("%.2f")
        .build(&mut mass1)
    {
        commands.push(LabCommand::SetMass1(snap_tenth(mass1)));
    }
    let mut mass2 = settings.mass2;
    if ui
        .slider_config("Mass 2", min, max)
        .display_format("%.2f")
        .build(&mut mass2)
    {
        commands.push(LabCommand::SetMass2(snap_tenth(mass2)));
    }

    let trails_label = if settings.show_trails {
        "Hide Trails"
    } else {
        "Show Trails"
    };
    if ui.button(trails_label) {
        commands.push(LabCommand::ToggleTrails);
    }

    ui.separator();
    chart::energy_chart(ui, state.energy());
}

/// Full-width coloured button, highlighted while its tool is active.
fn tool_button(ui: &Ui, label: &str, color: [f32; 4], active: bool) -> bool {
    let _button = ui.push_style_color(StyleColor::Button, color);
    let _border = active.then(|| ui.push_style_color(StyleColor::Border, ACTIVE_TOOL));
    let _border_size = active.then(|| ui.push_style_var(imgui::StyleVar::FrameBorderSize(2.0)));
    ui.button_with_size(label, [-1.0, 0.0])
}

#[cfg(test)]
mod tests {
    use super::snap_tenth;

    #[test]
    fn slider_values_snap_to_tenths() {
        assert_eq!(snap_tenth(-9.8123), -9.8);
        assert_eq!(snap_tenth(0.149), 0.1);
        assert_eq!(snap_tenth(19.96), 20.0);
    }
}
