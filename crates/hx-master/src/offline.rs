//! Offline rendering: play a show start to finish into memory.

use hx_engine::{Frame, MediaClock, Program, ProgramSource, TimeUpdateTimer};
use hx_formats::Show;
use hx_ir::ConfigError;

use crate::{build_session, CHUNK};

/// Render `show` from 0 s until the program ends or `max_seconds` have
/// been produced. Time updates fire at the show's cadence, as they would
/// during live playback.
pub fn render_frames(
    show: &Show,
    program: &Program,
    sample_rate: u32,
    max_seconds: f64,
) -> Result<Vec<Frame>, ConfigError> {
    let mut session = build_session(show, program, sample_rate)?;
    let mut timer = TimeUpdateTimer::new(show.config.time_update_interval);
    let limit = program
        .duration()
        .unwrap_or(0.0)
        .min(max_seconds.max(0.0));
    let max_frames = (limit * sample_rate as f64).ceil() as usize;

    let mut frames = vec![Frame::silence(); max_frames];
    for block in frames.chunks_mut(CHUNK) {
        if timer.due(session.clock().audio_time()) {
            session.on_time_update();
        }
        session.render_block(program, block);
    }
    Ok(frames)
}

pub fn render_to_wav(
    show: &Show,
    program: &Program,
    sample_rate: u32,
    max_seconds: f64,
) -> Result<Vec<u8>, ConfigError> {
    let frames = render_frames(show, program, sample_rate, max_seconds)?;
    Ok(hx_formats::frames_to_wav(&frames, sample_rate))
}
