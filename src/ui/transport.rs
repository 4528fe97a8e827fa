//! Transport bar: Open, Track, Play/Stop, seek bar, show info, playback position.

use super::{cue_label, process_actions, GuiState};
use super::input::GuiAction;

pub fn transport_panel(ui: &imgui::Ui, gui: &mut GuiState) {
    if ui.button("Open") {
        open_show_dialog(gui);
    }
    ui.same_line();
    let loaded = gui.controller.show().is_some();
    ui.disabled(!loaded, || {
        if ui.button("Track") {
            open_track_dialog(gui);
        }
    });
    ui.same_line();
    ui.separator();
    ui.same_line();

    let playing = gui.controller.is_playing();
    let label = if playing { "Stop" } else { "Play" };
    ui.disabled(!loaded, || {
        if ui.button(label) {
            process_actions(gui, &[GuiAction::TogglePlayStop]);
        }
    });
    ui.same_line();
    ui.separator();
    ui.same_line();

    if let Some(show) = gui.controller.show() {
        ui.text(&show.title);
        ui.same_line();
    }

    let time = gui.frame.playback_time;
    let duration = gui.frame.duration;
    ui.text(format!(
        "{} | {:>6.2}s / {:.2}s | {:>6.1}°",
        cue_label(&gui.frame),
        time,
        duration,
        gui.frame.orientation.degrees()
    ));

    if !gui.status.is_empty() {
        ui.same_line();
        ui.text(&gui.status);
    }

    if loaded && duration > 0.0 {
        rate_slider(ui, gui);
        ui.same_line();
        seek_bar(ui, gui, time, duration);
    }
}

fn rate_slider(ui: &imgui::Ui, gui: &mut GuiState) {
    let mut rate = gui.controller.playback_rate() as f32;
    ui.set_next_item_width(120.0);
    if ui.slider_config("##rate", 0.25, 4.0)
        .display_format("%.2fx")
        .build(&mut rate)
    {
        process_actions(gui, &[GuiAction::SetRate(rate as f64)]);
    }
}

fn seek_bar(ui: &imgui::Ui, gui: &mut GuiState, time: f64, duration: f64) {
    let mut position = time as f32;
    ui.set_next_item_width(-1.0);
    if ui.slider_config("##seek", 0.0, duration as f32)
        .display_format("%.2f s")
        .build(&mut position)
    {
        process_actions(gui, &[GuiAction::Seek(position as f64)]);
    }
}

fn open_show_dialog(gui: &mut GuiState) {
    let file = rfd::FileDialog::new()
        .add_filter("Show files", &["toml", "TOML"])
        .pick_file();

    let Some(path) = file else { return };

    match gui.controller.load_show(&path) {
        Err(e) => gui.status = format!("Load error: {e}"),
        Ok(()) => {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            gui.status = format!("Loaded {name}");
            gui.map = Default::default();
        }
    }
}

fn open_track_dialog(gui: &mut GuiState) {
    let file = rfd::FileDialog::new()
        .add_filter("WAV files", &["wav", "WAV"])
        .pick_file();

    let Some(path) = file else { return };

    match gui.controller.load_program(&path) {
        Err(e) => gui.status = format!("Track error: {e}"),
        Ok(()) => {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            gui.status = format!("Track {name}");
        }
    }
}
