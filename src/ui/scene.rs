//! Scene panel: the transforms a 3D renderer would apply this frame, plus
//! per-speaker gain faders.

use hx_master::SceneTransforms;

use super::input::GuiAction;
use super::{process_actions, GuiState};

pub fn scene_panel(ui: &imgui::Ui, gui: &mut GuiState) {
    let transforms = SceneTransforms::from_view(&gui.frame);
    ui.text(format!(
        "Camera yaw {:+.3} rad  arrow ({:+.2}, {:+.2})",
        transforms.camera_yaw, transforms.arrow.0, transforms.arrow.1
    ));

    let mut actions = Vec::new();
    if let Some(_table) = ui.begin_table("speakers", 3) {
        ui.table_setup_column("Spk");
        ui.table_setup_column("Position");
        ui.table_setup_column("Gain");
        ui.table_headers_row();

        for (i, speaker) in transforms.speakers.iter().enumerate() {
            ui.table_next_row();
            ui.table_next_column();
            ui.text(format!("{}", i + 1));
            ui.table_next_column();
            ui.text(format!("{:+.1} {:+.1} {:+.1}", speaker.world.x, speaker.world.y, speaker.world.z));
            ui.table_next_column();
            let mut gain = speaker.intensity;
            ui.set_next_item_width(-1.0);
            if ui.slider(format!("##gain{i}"), 0.0, 1.0, &mut gain) {
                actions.push(GuiAction::SetSpeakerGain { speaker: i, value: gain });
            }
        }
    }
    process_actions(gui, &actions);
}
