//! 2D top-down map: the speaker ring, lit by gain, and the listener arrow.
//!
//! Dragging empty map space rotates the listener. On movable layouts,
//! dragging a speaker moves it.

use hx_master::{InputEvent, SceneTransforms, Vec3};

use super::input::GuiAction;
use super::{gain_color, process_actions, GuiState};

const SPEAKER_RADIUS: f32 = 10.0;
const LISTENER_RADIUS: f32 = 6.0;
const ARROW_LEN: f32 = 28.0;
/// Fraction of the half-extent left as margin around the ring.
const MARGIN: f32 = 0.85;

const BG: [f32; 4] = [0.12, 0.12, 0.14, 1.0];
const RING: [f32; 4] = [0.30, 0.30, 0.36, 1.0];
const LISTENER: [f32; 4] = [0.55, 0.75, 0.95, 1.0];
const TEXT_COLOR: [f32; 4] = [0.85, 0.85, 0.85, 1.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MapDrag {
    Rotate,
    Speaker(usize),
}

/// Pointer state carried between frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapState {
    drag: Option<MapDrag>,
}

/// Screen-space placement of the room: meters to pixels and back.
#[derive(Clone, Copy, Debug, PartialEq)]
struct MapGeometry {
    center: [f32; 2],
    scale: f32,
}

impl MapGeometry {
    /// Fit a room of half-width `extent` meters into a `size` panel at `origin`.
    fn fit(origin: [f32; 2], size: [f32; 2], extent: f32) -> Self {
        let half = size[0].min(size[1]) * 0.5;
        Self {
            center: [origin[0] + size[0] * 0.5, origin[1] + size[1] * 0.5],
            scale: half * MARGIN / extent.max(0.5),
        }
    }

    /// Map coordinates (x right, z toward the back) to screen pixels.
    fn to_screen(&self, map: (f32, f32)) -> [f32; 2] {
        [
            self.center[0] + map.0 * self.scale,
            self.center[1] + map.1 * self.scale,
        ]
    }

    fn to_map(&self, screen: [f32; 2]) -> (f32, f32) {
        (
            (screen[0] - self.center[0]) / self.scale,
            (screen[1] - self.center[1]) / self.scale,
        )
    }
}

/// Index of the speaker drawn under `point`, nearest first.
fn hit_speaker(geometry: &MapGeometry, transforms: &SceneTransforms, point: [f32; 2]) -> Option<usize> {
    transforms
        .speakers
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let p = geometry.to_screen(s.map);
            let (dx, dy) = (p[0] - point[0], p[1] - point[1]);
            (i, dx * dx + dy * dy)
        })
        .filter(|&(_, d2)| d2 <= SPEAKER_RADIUS * SPEAKER_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

pub fn map_panel(ui: &imgui::Ui, gui: &mut GuiState) {
    let Some(session) = gui.controller.session() else {
        return;
    };
    let movable = session.layout().is_movable();
    let extent = session.layout().radius();

    let transforms = SceneTransforms::from_view(&gui.frame);
    let avail = ui.content_region_avail();
    let origin = ui.cursor_screen_pos();
    let geometry = MapGeometry::fit(origin, avail, extent);

    ui.invisible_button("map_zone", avail);
    let actions = pointer_actions(ui, gui, &geometry, &transforms, movable);
    process_actions(gui, &actions);

    let transforms = SceneTransforms::from_view(&gui.frame);
    draw_map(ui, &geometry, &transforms, avail, origin);
}

fn pointer_actions(
    ui: &imgui::Ui,
    gui: &mut GuiState,
    geometry: &MapGeometry,
    transforms: &SceneTransforms,
    movable: bool,
) -> Vec<GuiAction> {
    let mouse = ui.io().mouse_pos;
    let mut actions = Vec::new();

    if ui.is_item_activated() {
        let drag = match hit_speaker(geometry, transforms, mouse) {
            Some(speaker) if movable => MapDrag::Speaker(speaker),
            _ => MapDrag::Rotate,
        };
        if drag == MapDrag::Rotate {
            actions.push(GuiAction::Input(InputEvent::PointerDown { inside: true }));
        }
        gui.map.drag = Some(drag);
    }

    match gui.map.drag {
        Some(MapDrag::Rotate) if ui.is_item_active() => {
            let dx = ui.io().mouse_delta[0];
            if dx != 0.0 {
                actions.push(GuiAction::Input(InputEvent::PointerMove { dx }));
            }
        }
        Some(MapDrag::Speaker(speaker)) if ui.is_item_active() => {
            let (x, z) = geometry.to_map(mouse);
            let y = transforms.speakers.get(speaker).map_or(0.0, |s| s.world.y);
            actions.push(GuiAction::MoveSpeaker {
                speaker,
                position: Vec3::new(x, y, z),
            });
        }
        _ => {}
    }

    if ui.is_item_deactivated() {
        if gui.map.drag == Some(MapDrag::Rotate) {
            actions.push(GuiAction::Input(InputEvent::PointerUp));
        }
        gui.map.drag = None;
    }

    actions
}

fn draw_map(
    ui: &imgui::Ui,
    geometry: &MapGeometry,
    transforms: &SceneTransforms,
    avail: [f32; 2],
    origin: [f32; 2],
) {
    let draw_list = ui.get_window_draw_list();
    let max = [origin[0] + avail[0], origin[1] + avail[1]];
    draw_list.add_rect(origin, max, BG).filled(true).build();

    if let Some(first) = transforms.speakers.first() {
        let (x, z) = first.map;
        let ring = (x * x + z * z).sqrt() * geometry.scale;
        draw_list
            .add_circle(geometry.center, ring, RING)
            .num_segments(64)
            .build();
    }

    for (i, speaker) in transforms.speakers.iter().enumerate() {
        let p = geometry.to_screen(speaker.map);
        draw_list
            .add_circle(p, SPEAKER_RADIUS, gain_color(speaker.intensity))
            .filled(true)
            .build();
        let label = format!("{}", i + 1);
        let size = ui.calc_text_size(&label);
        draw_list.add_text([p[0] - size[0] / 2.0, p[1] - size[1] / 2.0], BG, &label);
    }

    let c = geometry.center;
    let (ax, ay) = transforms.arrow;
    let tip = [c[0] + ax * ARROW_LEN, c[1] + ay * ARROW_LEN];
    draw_list.add_line(c, tip, LISTENER).thickness(2.5).build();
    draw_list
        .add_circle(c, LISTENER_RADIUS, LISTENER)
        .filled(true)
        .build();
    draw_list.add_text(
        [origin[0] + 6.0, origin[1] + 4.0],
        TEXT_COLOR,
        "Front",
    );
}
