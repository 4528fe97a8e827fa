//! Lane view: the program waveform over the cue timeline, one lane per
//! speaker showing its gain in each cue, and the playhead. Click to seek.

use super::input::GuiAction;
use super::{gain_color, process_actions, GuiState};

const WAVE_H: f32 = 48.0;
const LANE_GAP: f32 = 2.0;

const BG: [f32; 4] = [0.10, 0.10, 0.12, 1.0];
const WAVE: [f32; 4] = [0.45, 0.60, 0.45, 1.0];
const CUE_A: [f32; 4] = [0.16, 0.16, 0.20, 1.0];
const CUE_B: [f32; 4] = [0.19, 0.19, 0.24, 1.0];
const CUE_ACTIVE: [f32; 4] = [0.24, 0.26, 0.34, 1.0];
const CUE_LINE: [f32; 4] = [0.50, 0.50, 0.60, 1.0];
const PLAYHEAD: [f32; 4] = [0.95, 0.35, 0.30, 1.0];

/// Horizontal timeline mapping: seconds to pixels and back.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Timeline {
    x0: f32,
    width: f32,
    duration: f64,
}

impl Timeline {
    fn x_at(&self, time: f64) -> f32 {
        if self.duration <= 0.0 {
            return self.x0;
        }
        let t = (time / self.duration).clamp(0.0, 1.0);
        self.x0 + self.width * t as f32
    }

    fn time_at(&self, x: f32) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        let t = ((x - self.x0) / self.width).clamp(0.0, 1.0);
        t as f64 * self.duration
    }
}

pub fn lanes_panel(ui: &imgui::Ui, gui: &mut GuiState) {
    let avail = ui.content_region_avail();
    let origin = ui.cursor_screen_pos();
    let timeline = Timeline {
        x0: origin[0],
        width: avail[0],
        duration: gui.frame.duration,
    };

    ui.invisible_button("lanes_zone", avail);
    let seek = (ui.is_item_active() && ui.is_mouse_down(imgui::MouseButton::Left))
        .then(|| timeline.time_at(ui.io().mouse_pos[0]));

    if let Some(time) = seek {
        process_actions(gui, &[GuiAction::Seek(time)]);
    }

    draw_lanes(ui, gui, &timeline, origin, avail);
}

fn draw_lanes(ui: &imgui::Ui, gui: &GuiState, timeline: &Timeline, origin: [f32; 2], avail: [f32; 2]) {
    let Some(session) = gui.controller.session() else {
        return;
    };
    let schedule = session.schedule();
    let draw_list = ui.get_window_draw_list();
    let bottom = origin[1] + avail[1];
    draw_list
        .add_rect(origin, [origin[0] + avail[0], bottom], BG)
        .filled(true)
        .build();

    // Cue bands behind everything.
    let active = gui.frame.active_cue;
    for i in 0..schedule.len() {
        let Some((start, end)) = schedule.interval(i) else {
            continue;
        };
        let x1 = timeline.x_at(start);
        let x2 = timeline.x_at(end.unwrap_or(timeline.duration));
        let color = match (active == Some(i), i % 2) {
            (true, _) => CUE_ACTIVE,
            (false, 0) => CUE_A,
            _ => CUE_B,
        };
        draw_list.add_rect([x1, origin[1]], [x2, bottom], color).filled(true).build();
        draw_list.add_line([x1, origin[1]], [x1, bottom], CUE_LINE).build();
    }

    // Waveform strip.
    let mid = origin[1] + WAVE_H * 0.5;
    if let Some(waveform) = gui.controller.waveform() {
        let peaks = waveform.peaks();
        let step = avail[0] / peaks.len().max(1) as f32;
        for (i, &(lo, hi)) in peaks.iter().enumerate() {
            let x = origin[0] + i as f32 * step;
            let top = mid - hi.clamp(-1.0, 1.0) * WAVE_H * 0.5;
            let bot = mid - lo.clamp(-1.0, 1.0) * WAVE_H * 0.5;
            draw_list.add_line([x, top], [x, bot.max(top + 1.0)], WAVE).build();
        }
    }

    // One lane per speaker.
    let speakers = schedule.speaker_count();
    let lanes_top = origin[1] + WAVE_H + LANE_GAP;
    let lane_h = ((bottom - lanes_top) / speakers.max(1) as f32 - LANE_GAP).max(2.0);
    for speaker in 0..speakers {
        let y = lanes_top + speaker as f32 * (lane_h + LANE_GAP);
        for i in 0..schedule.len() {
            let gain = schedule
                .pattern_for_cue(i)
                .and_then(|p| p.gain(speaker))
                .unwrap_or(0.0);
            if gain <= 0.0 {
                continue;
            }
            let Some((start, end)) = schedule.interval(i) else {
                continue;
            };
            let x1 = timeline.x_at(start);
            let x2 = timeline.x_at(end.unwrap_or(timeline.duration));
            draw_list
                .add_rect([x1 + 1.0, y], [x2 - 1.0, y + lane_h], gain_color(gain))
                .filled(true)
                .build();
        }
    }

    let x = timeline.x_at(gui.frame.playback_time);
    draw_list
        .add_line([x, origin[1]], [x, bottom], PLAYHEAD)
        .thickness(2.0)
        .build();
}
