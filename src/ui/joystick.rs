//! Virtual joystick: hold and push sideways to spin the listener.

use hx_master::{InputEvent, JoystickState};

use super::input::GuiAction;
use super::{process_actions, GuiState};

const PAD_RADIUS: f32 = 48.0;
const KNOB_RADIUS: f32 = 14.0;

const PAD: [f32; 4] = [0.20, 0.20, 0.24, 1.0];
const PAD_BORDER: [f32; 4] = [0.40, 0.40, 0.48, 1.0];
const KNOB: [f32; 4] = [0.55, 0.75, 0.95, 1.0];

/// Knob deflection shown between frames, normalized to the pad radius.
#[derive(Clone, Copy, Debug, Default)]
pub struct JoystickWidget {
    knob: (f32, f32),
}

/// Normalized deflection of `point` from `center`, clamped to the unit disk.
fn deflection(center: [f32; 2], point: [f32; 2], radius: f32) -> (f32, f32) {
    let x = (point[0] - center[0]) / radius;
    let y = (point[1] - center[1]) / radius;
    let len = (x * x + y * y).sqrt();
    if len > 1.0 {
        (x / len, y / len)
    } else {
        (x, y)
    }
}

pub fn joystick_panel(ui: &imgui::Ui, gui: &mut GuiState) {
    let state = gui
        .controller
        .session()
        .map(|s| (s.orientation().joystick_state(), s.orientation().velocity()));
    match state {
        Some((JoystickState::Idle, _)) | None => ui.text("Joystick: idle"),
        Some((JoystickState::Active, v)) => ui.text(format!("Joystick: {v:+.2}°/tick")),
        Some((JoystickState::Decaying, v)) => ui.text(format!("Joystick: coasting {v:+.2}°/tick")),
    }

    let size = [PAD_RADIUS * 2.0, PAD_RADIUS * 2.0];
    let origin = ui.cursor_screen_pos();
    let center = [origin[0] + PAD_RADIUS, origin[1] + PAD_RADIUS];

    ui.invisible_button("joystick_pad", size);
    let mut actions = Vec::new();
    if ui.is_item_active() {
        let (x, y) = deflection(center, ui.io().mouse_pos, PAD_RADIUS);
        gui.joystick.knob = (x, y);
        actions.push(GuiAction::Input(InputEvent::JoystickMove { x, y }));
    }
    if ui.is_item_deactivated() {
        gui.joystick.knob = (0.0, 0.0);
        actions.push(GuiAction::Input(InputEvent::JoystickRelease));
    }
    process_actions(gui, &actions);

    let draw_list = ui.get_window_draw_list();
    draw_list
        .add_circle(center, PAD_RADIUS, PAD)
        .filled(true)
        .num_segments(48)
        .build();
    draw_list
        .add_circle(center, PAD_RADIUS, PAD_BORDER)
        .num_segments(48)
        .build();
    let (kx, ky) = gui.joystick.knob;
    let travel = PAD_RADIUS - KNOB_RADIUS;
    draw_list
        .add_circle([center[0] + kx * travel, center[1] + ky * travel], KNOB_RADIUS, KNOB)
        .filled(true)
        .build();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deflection_inside_pad_is_linear() {
        let (x, y) = deflection([100.0, 100.0], [124.0, 88.0], 48.0);
        assert!((x - 0.5).abs() < 1e-6);
        assert!((y + 0.25).abs() < 1e-6);
    }

    #[test]
    fn deflection_clamps_to_unit_disk() {
        let (x, y) = deflection([0.0, 0.0], [300.0, 400.0], 50.0);
        assert!((x - 0.6).abs() < 1e-6);
        assert!((y - 0.8).abs() < 1e-6);
    }
}
