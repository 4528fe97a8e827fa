//! End-to-end scenarios against a full session: schedule resolution,
//! idempotent time updates, ramp superseding, rotation input and snapshot
//! consistency.

use hx_engine::{
    DragState, EngineConfig, Frame, InputEvent, JoystickState, MediaClock, PannerBank, RotateKey,
    Session, SnapshotView, TestTone,
};
use hx_ir::{GainRouting, Schedule, SpeakerLayout};

/// 1 kHz so one frame is one millisecond of audio time.
const RATE: u32 = 1000;

const TIMESTAMPS: [f64; 4] = [0.0, 1.483, 3.311, 4.59];

fn presets() -> Vec<Vec<f32>> {
    [0usize, 2, 4, 1]
        .iter()
        .map(|&lit| (0..6).map(|i| if i == lit { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn hexagon_session() -> Session<PannerBank> {
    let schedule = Schedule::new(&TIMESTAMPS, &presets(), 6).unwrap();
    Session::new(
        schedule,
        SpeakerLayout::hexagon(),
        GainRouting::identity(6),
        EngineConfig::default(),
        PannerBank::new(6, 1.0),
        RATE,
        8.0,
    )
    .unwrap()
}

#[test]
fn time_update_at_two_seconds_lights_speaker_two() {
    let mut session = hexagon_session();
    let update = session.seek(2.0);
    assert_eq!(update.cue, 1);
    assert!(update.changed);

    let graph = session.graph();
    for speaker in 0..6 {
        let expected = if speaker == 2 { 1.0 } else { 0.0 };
        assert_eq!(graph.target_gain(speaker), Some(expected), "speaker {speaker}");
    }

    // Ramp completes 100 ms later on the audio clock.
    session.advance(100);
    session.on_time_update();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.speaker_gain(2), Some(1.0));
    assert_eq!(snapshot.speaker_gain(0), Some(0.0));
}

#[test]
fn repeated_time_update_is_idempotent() {
    let mut session = hexagon_session();
    session.seek(2.0);
    session.advance(30);
    let ramp_before = *session.graph().ramp(2).unwrap();

    // Media time moved 30 ms but stays inside cue 1.
    let update = session.on_time_update();
    assert_eq!(update.cue, 1);
    assert!(!update.changed);
    assert_eq!(*session.graph().ramp(2).unwrap(), ramp_before);
}

#[test]
fn seeking_backwards_resolves_fresh() {
    let mut session = hexagon_session();
    assert_eq!(session.seek(5.0).cue, 3);
    assert_eq!(session.seek(0.5).cue, 0);
    assert_eq!(session.seek(-1.0).cue, 0);
    assert_eq!(session.graph().target_gain(0), Some(1.0));
}

#[test]
fn superseding_ramp_starts_where_the_old_one_was() {
    let mut session = hexagon_session();
    // Ramp A: speaker 2 from 0 to 1 over 100 ms.
    session.seek(2.0);
    session.advance(40);
    let now = session.clock().audio_time();
    let before = session.graph().gain_at(2, now).unwrap();
    assert!((before - 0.4).abs() < 1e-4);

    // Ramp B: speaker 2 back to 0, started 40 ms into A.
    assert!(session.set_speaker_gain(2, 0.0));
    let ramp = session.graph().ramp(2).unwrap();
    assert_eq!(ramp.from, before);
    assert_eq!(ramp.to, 0.0);
    assert_eq!(session.graph().gain_at(2, now), Some(before));
}

#[test]
fn drag_deltas_wrap_into_range() {
    let mut session = hexagon_session();
    session.apply_input(InputEvent::PointerDown { inside: true });
    assert_eq!(session.orientation().drag_state(), DragState::Dragging);
    // 0.3 degrees per pixel: 1000 px right then 1500 px left = -150 degrees.
    session.apply_input(InputEvent::PointerMove { dx: 1000.0 });
    session.apply_input(InputEvent::PointerMove { dx: -1500.0 });
    session.apply_input(InputEvent::PointerUp);

    let degrees = session.snapshot().orientation().degrees();
    assert!((degrees - 210.0).abs() < 1e-3, "got {degrees}");
    assert_eq!(session.orientation().drag_state(), DragState::Idle);
}

#[test]
fn pointer_outside_zone_does_not_drag() {
    let mut session = hexagon_session();
    session.apply_input(InputEvent::PointerDown { inside: false });
    assert!(session.apply_input(InputEvent::PointerMove { dx: 50.0 }).is_none());
    assert_eq!(session.snapshot().orientation().degrees(), 0.0);
}

#[test]
fn joystick_release_decays_within_44_ticks() {
    let mut session = hexagon_session();
    // Full rate is 3 degrees per tick; a third of the way gives v = 1.
    session.apply_input(InputEvent::JoystickMove { x: 1.0 / 3.0, y: 0.0 });
    for _ in 0..10 {
        session.animation_frame();
    }
    let v = session.orientation().velocity();
    assert!((v - 1.0).abs() < 1e-5);

    session.apply_input(InputEvent::JoystickRelease);
    let mut ticks = 0;
    while session.orientation().joystick_state() != JoystickState::Idle {
        session.animation_frame();
        ticks += 1;
        assert!(ticks <= 44, "still coasting after {ticks} ticks");
    }
    assert!(session.orientation().velocity().abs() < 0.01 * v);
}

#[test]
fn held_key_rotates_every_frame_and_reaches_the_graph() {
    let mut session = hexagon_session();
    session.apply_input(InputEvent::KeyDown(RotateKey::Left));
    for _ in 0..5 {
        session.animation_frame();
    }
    session.apply_input(InputEvent::KeyUp(RotateKey::Left));
    session.animation_frame();

    let degrees = session.snapshot().orientation().degrees();
    assert!((degrees - 350.0).abs() < 1e-3);
    assert_eq!(session.graph().listener_orientation().degrees(), degrees);
    assert_eq!(session.graph().spatializer().listener().forward, session.graph().listener_orientation().forward());
}

#[test]
fn reset_faces_front() {
    let mut session = hexagon_session();
    session.apply_input(InputEvent::KeyDown(RotateKey::Right));
    session.animation_frame();
    session.apply_input(InputEvent::ResetOrientation);
    assert_eq!(session.snapshot().orientation().degrees(), 0.0);
}

#[test]
fn snapshot_matches_graph_after_every_handler() {
    let mut session = hexagon_session();
    let tone = TestTone::new(8.0);
    let mut block = vec![Frame::default(); 50];

    for step in 0..40 {
        session.render_block(&tone, &mut block);
        if step % 2 == 0 {
            session.on_time_update();
        } else {
            session.animation_frame();
        }
        let now = session.clock().audio_time();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.active_pattern(), session.scheduler().active_pattern());
        assert_eq!(snapshot.active_cue, session.scheduler().active_cue());
        for speaker in 0..6 {
            assert_eq!(snapshot.speaker_gain(speaker), session.graph().gain_at(speaker, now));
        }
    }
    assert_eq!(session.snapshot().active_pattern(), Some(1));
}

#[test]
fn fixed_layout_rejects_speaker_moves() {
    let mut session = hexagon_session();
    let before = session.snapshot().speaker_position(0);
    assert!(!session.move_speaker(0, hx_ir::Vec3::new(1.0, 0.0, 1.0)));
    assert_eq!(session.snapshot().speaker_position(0), before);
}
