//! UI modules and layout composition.

pub mod input;
mod joystick;
mod lanes;
mod map;
mod scene;
mod transport;

use hx_master::{Controller, FrameSnapshot, SnapshotView};
use input::GuiAction;

/// UI-facing state bundle, passed to all panel functions.
/// No GL/imgui/renderer fields.
pub struct GuiState {
    pub controller: Controller,
    /// Latest published snapshot; every panel draws from it. Refreshed after
    /// each batch of actions so input lands in the frame it happened in.
    pub frame: FrameSnapshot,
    pub status: String,
    pub map: map::MapState,
    pub joystick: joystick::JoystickWidget,
}

impl GuiState {
    pub fn new() -> Self {
        Self::with_controller(Controller::new())
    }

    pub fn with_controller(controller: Controller) -> Self {
        Self {
            controller,
            frame: FrameSnapshot::default(),
            status: String::new(),
            map: map::MapState::default(),
            joystick: joystick::JoystickWidget::default(),
        }
    }

    /// Feed the audio output, run the animation tick and take its snapshot.
    pub fn begin_frame(&mut self) {
        self.controller.pump();
        if let Some(snapshot) = self.controller.animation_frame() {
            self.frame = snapshot.clone();
        }
        if self.controller.is_finished() && self.status == "Playing..." {
            self.status = "Finished".to_string();
        }
    }
}

impl Default for GuiState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_ui(ui: &imgui::Ui, gui: &mut GuiState) {
    let actions = input::poll_actions(ui);
    process_actions(gui, &actions);

    let display_size = ui.io().display_size;
    ui.window("hexaphonic")
        .position([0.0, 0.0], imgui::Condition::Always)
        .size(display_size, imgui::Condition::Always)
        .flags(
            imgui::WindowFlags::NO_TITLE_BAR
                | imgui::WindowFlags::NO_RESIZE
                | imgui::WindowFlags::NO_MOVE
                | imgui::WindowFlags::NO_COLLAPSE
                | imgui::WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS,
        )
        .build(|| {
            transport::transport_panel(ui, gui);
            ui.separator();

            if gui.controller.show().is_none() {
                ui.text("Open a show file to begin.");
                return;
            }

            let avail = ui.content_region_avail();
            let right_w = 260.0_f32;
            let left_w = (avail[0] - right_w - 8.0).max(200.0);
            let lanes_h = (avail[1] * 0.35).max(120.0);
            let map_h = (avail[1] - lanes_h - 8.0).max(120.0);

            ui.child_window("map")
                .size([left_w, map_h])
                .build(|| map::map_panel(ui, gui));
            ui.same_line();
            ui.child_window("side")
                .size([right_w, map_h])
                .build(|| {
                    joystick::joystick_panel(ui, gui);
                    ui.separator();
                    scene::scene_panel(ui, gui);
                });

            ui.child_window("lanes")
                .size([avail[0], lanes_h])
                .build(|| lanes::lanes_panel(ui, gui));
        });
}

pub fn process_actions(gui: &mut GuiState, actions: &[GuiAction]) {
    for action in actions {
        match *action {
            GuiAction::TogglePlayStop => toggle_play(gui),
            GuiAction::Seek(time) => {
                if let Err(e) = gui.controller.seek(time) {
                    gui.status = e.to_string();
                }
            }
            GuiAction::Input(event) => {
                gui.controller.apply_input(event);
            }
            GuiAction::SetSpeakerGain { speaker, value } => {
                gui.controller.set_speaker_gain(speaker, value);
            }
            GuiAction::MoveSpeaker { speaker, position } => {
                if !gui.controller.move_speaker(speaker, position) {
                    gui.status = "Speakers are fixed in this layout".to_string();
                }
            }
            GuiAction::SetRate(rate) => {
                if let Err(e) = gui.controller.set_playback_rate(rate) {
                    gui.status = e.to_string();
                }
            }
        }
    }
    if !actions.is_empty() {
        if let Some(snapshot) = gui.controller.snapshot() {
            gui.frame = snapshot.clone();
        }
    }
}

fn toggle_play(gui: &mut GuiState) {
    if gui.controller.is_playing() {
        gui.controller.stop();
        gui.status = "Stopped".to_string();
        return;
    }
    match gui.controller.play() {
        Ok(()) => gui.status = "Playing...".to_string(),
        Err(e) => gui.status = e.to_string(),
    }
}

/// Map a gain in [0, 1] to a dim-to-bright speaker color.
fn gain_color(gain: f32) -> [f32; 4] {
    let g = gain.clamp(0.0, 1.0);
    [0.25 + 0.75 * g, 0.25 + 0.55 * g, 0.2, 1.0]
}

/// Label for the cue active in `frame`, if any.
fn cue_label(frame: &FrameSnapshot) -> String {
    match frame.active_cue {
        Some(cue) => format!("Cue {}", cue + 1),
        None => "Cue -".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_color_brightens_with_gain() {
        let dim = gain_color(0.0);
        let lit = gain_color(1.0);
        assert!(lit[0] > dim[0]);
        assert_eq!(gain_color(2.0), lit);
    }

    #[test]
    fn cue_label_is_one_based() {
        let mut frame = FrameSnapshot::default();
        assert_eq!(cue_label(&frame), "Cue -");
        frame.active_cue = Some(2);
        assert_eq!(cue_label(&frame), "Cue 3");
    }

    fn gui_with_show() -> GuiState {
        let output = hx_audio::NullOutput::new(8000, 400);
        let mut gui = GuiState::with_controller(Controller::with_output(Box::new(output)));
        gui.controller
            .load_show_str(
                "[schedule]\ntimestamps = [0, 1]\npresets = [[1,0,0,0,0,0], [0,1,0,0,0,0]]\n",
            )
            .unwrap();
        gui
    }

    #[test]
    fn actions_refresh_the_frame_snapshot() {
        use hx_master::InputEvent;
        let mut gui = gui_with_show();
        process_actions(
            &mut gui,
            &[
                GuiAction::Input(InputEvent::PointerDown { inside: true }),
                GuiAction::Input(InputEvent::PointerMove { dx: 100.0 }),
            ],
        );
        assert!((gui.frame.orientation.degrees() - 30.0).abs() < 1e-4);

        process_actions(&mut gui, &[GuiAction::Seek(1.5)]);
        assert_eq!(gui.frame.active_cue, Some(1));
        assert_eq!(gui.frame.playback_time, 1.5);
    }

    #[test]
    fn rate_action_reaches_controller() {
        let mut gui = gui_with_show();
        process_actions(&mut gui, &[GuiAction::SetRate(2.0)]);
        assert_eq!(gui.controller.playback_rate(), 2.0);
        assert!(gui.status.is_empty());
    }
}
