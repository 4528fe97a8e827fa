//! Allocation-free render path tests.
//!
//! These tests verify that the per-frame work of a running session does not
//! allocate: rendering through the panner bank, the media time-update
//! handler firing pattern changes, animation frames and rotation input.
//! Each test warms up once outside the guard so lazily-registered log
//! callsites are not counted.
//!
//! Just run `cargo test`; no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use hx_engine::{
    Frame, InputEvent, MediaClock, PannerBank, RotateKey, Session, TestTone, TimeUpdateTimer,
};
use std::path::PathBuf;

const RATE: u32 = 44_100;
const CHUNK: usize = 256;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shows")
}

fn session(name: &str, program: &TestTone) -> (Session<PannerBank>, TimeUpdateTimer) {
    use hx_engine::ProgramSource;
    let show = hx_formats::load_show(&fixtures_dir().join(name)).unwrap();
    let session = Session::new(
        show.schedule,
        show.layout,
        show.routing,
        show.config.clone(),
        PannerBank::new(show.layout.count(), show.config.reference_distance),
        RATE,
        program.duration().unwrap(),
    )
    .unwrap();
    (session, TimeUpdateTimer::new(show.config.time_update_interval))
}

/// One cooperative loop pass: time update when due, a chunk of audio, one
/// animation frame.
fn run(session: &mut Session<PannerBank>, timer: &mut TimeUpdateTimer, program: &TestTone, block: &mut [Frame], chunks: usize) {
    for _ in 0..chunks {
        if timer.due(session.clock().audio_time()) {
            session.on_time_update();
        }
        session.render_block(program, block);
        session.animation_frame();
    }
}

fn assert_session_alloc_free(name: &str, seconds: f64) {
    let program = TestTone::new(seconds + 1.0);
    let (mut session, mut timer) = session(name, &program);
    let mut block = [Frame::default(); CHUNK];
    let chunks = (seconds * RATE as f64) as usize / CHUNK;

    run(&mut session, &mut timer, &program, &mut block, chunks);
    session.seek(0.0);
    timer.fire_next();

    assert_no_alloc(|| {
        run(&mut session, &mut timer, &program, &mut block, chunks);
    });
}

#[test]
fn hexagon_show_alloc_free() {
    assert_session_alloc_free("hexagon.toml", 5.0);
}

#[test]
fn premiere_show_alloc_free() {
    assert_session_alloc_free("premiere.toml", 5.0);
}

#[test]
fn rotation_input_alloc_free() {
    let program = TestTone::new(3.0);
    let (mut session, mut timer) = session("hexagon.toml", &program);
    let mut block = [Frame::default(); CHUNK];

    let mut rotate = |session: &mut Session<PannerBank>| {
        session.apply_input(InputEvent::KeyDown(RotateKey::Left));
        run(session, &mut timer, &program, &mut block, 20);
        session.apply_input(InputEvent::KeyUp(RotateKey::Left));
        session.apply_input(InputEvent::JoystickMove { x: 0.8, y: 0.0 });
        run(session, &mut timer, &program, &mut block, 20);
        session.apply_input(InputEvent::JoystickRelease);
        session.apply_input(InputEvent::PointerDown { inside: true });
        session.apply_input(InputEvent::PointerMove { dx: 40.0 });
        session.apply_input(InputEvent::PointerUp);
        session.apply_input(InputEvent::ResetOrientation);
    };

    rotate(&mut session);
    assert_no_alloc(|| rotate(&mut session));
}
