//! Keyboard input mapping.
//!
//! Pure functions that convert imgui key state into GUI actions. Panels
//! produce the same actions from pointer input, so tests can inject them
//! without a real keyboard or mouse.

use hx_master::{InputEvent, RotateKey, Vec3};

/// An action produced by keyboard or pointer input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GuiAction {
    TogglePlayStop,
    /// Jump to media time, in seconds.
    Seek(f64),
    /// Listener rotation input, forwarded to the session.
    Input(InputEvent),
    SetSpeakerGain { speaker: usize, value: f32 },
    MoveSpeaker { speaker: usize, position: Vec3 },
    /// Media speed, 1.0 is normal.
    SetRate(f64),
}

/// Poll imgui key state and return all triggered actions.
///
/// Nothing is consumed while a text widget wants input.
pub fn poll_actions(ui: &imgui::Ui) -> Vec<GuiAction> {
    if ui.io().want_text_input {
        return Vec::new();
    }

    let mut actions = Vec::new();
    if ui.is_key_pressed_no_repeat(imgui::Key::Space) {
        actions.push(GuiAction::TogglePlayStop);
    }
    if ui.is_key_pressed_no_repeat(imgui::Key::R) {
        actions.push(GuiAction::Input(InputEvent::ResetOrientation));
    }
    poll_rotate_keys(ui, &mut actions);
    actions
}

/// Arrow keys rotate the listener for as long as they are held.
fn poll_rotate_keys(ui: &imgui::Ui, actions: &mut Vec<GuiAction>) {
    for (key, rotate) in [
        (imgui::Key::LeftArrow, RotateKey::Left),
        (imgui::Key::RightArrow, RotateKey::Right),
    ] {
        if ui.is_key_pressed_no_repeat(key) {
            actions.push(GuiAction::Input(InputEvent::KeyDown(rotate)));
        }
        if ui.is_key_released(key) {
            actions.push(GuiAction::Input(InputEvent::KeyUp(rotate)));
        }
    }
}
