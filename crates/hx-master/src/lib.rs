//! Headless controller for hexaphonic.
//!
//! Provides one API for loading shows, playback, input and offline
//! rendering that both the GUI and CLI share. Everything runs on the
//! caller's thread: `pump` renders exactly as much audio as the output can
//! take and fires time updates at the configured host cadence, so the
//! device callback never touches session state.

mod offline;

use std::ops::Range;
use std::path::Path;

use hx_audio::{AudioOutput, CpalOutput, NullOutput};
use hx_engine::{MediaClock, PannerBank, Session, TimeUpdateTimer};
use thiserror::Error;
use tracing::{debug, info, warn};

// Re-export common types so callers don't need hx-ir/hx-engine directly.
pub use hx_audio::AudioError;
pub use hx_engine::{
    DragState, FrameSnapshot, InputEvent, JoystickState, Program, ProgramBuffer, ProgramSource,
    RotateKey, SceneTransforms, SnapshotView, TestTone, Waveform,
};
pub use hx_engine::Frame;
pub use hx_formats::{FormatError, Show};
pub use hx_ir::{ConfigError, Orientation, Vec3};

pub use offline::{render_frames, render_to_wav};

/// Frames rendered between time-update checks.
const CHUNK: usize = 256;
/// Peak buckets precomputed for the lane view.
const WAVEFORM_BUCKETS: usize = 1024;
/// Silence after the last cue when no track is loaded.
const TONE_TAIL: f64 = 4.0;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("no show loaded")]
    NoShow,
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}

struct Loaded {
    show: Show,
    program: Program,
    waveform: Waveform,
    session: Session<PannerBank>,
}

/// Headless cue player: owns a show, its session, and an audio output.
pub struct Controller {
    output: Box<dyn AudioOutput>,
    loaded: Option<Loaded>,
    timer: TimeUpdateTimer,
    playing: bool,
    scratch: Vec<Frame>,
    /// Rendered frames the output has not taken yet, as a range of `scratch`.
    pending: Range<usize>,
}

impl Controller {
    /// Controller on the default audio device. Falls back to a silent
    /// output if no device can be opened.
    pub fn new() -> Self {
        Self::with_output(open_default_output())
    }

    pub fn with_output(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            loaded: None,
            timer: TimeUpdateTimer::new(hx_engine::EngineConfig::default().time_update_interval),
            playing: false,
            scratch: vec![Frame::silence(); CHUNK],
            pending: 0..0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.output.sample_rate()
    }

    // --- Show management ---

    /// Load a show file. A program track that cannot be read degrades to
    /// the test tone; a malformed show is an error and keeps the previous
    /// show loaded.
    pub fn load_show(&mut self, path: &Path) -> Result<(), ControlError> {
        let show = hx_formats::load_show(path)?;
        self.open_show(show)
    }

    pub fn load_show_str(&mut self, text: &str) -> Result<(), ControlError> {
        let show = hx_formats::parse_show(text)?;
        self.open_show(show)
    }

    pub fn open_show(&mut self, show: Show) -> Result<(), ControlError> {
        let program = match &show.program {
            Some(path) => load_program_or_tone(path, &show),
            None => tone_for(&show),
        };
        self.install(show, program)
    }

    /// Replace the program track of the current show.
    pub fn load_program(&mut self, path: &Path) -> Result<(), ControlError> {
        let show = self.loaded.as_ref().ok_or(ControlError::NoShow)?.show.clone();
        let data = std::fs::read(path).map_err(FormatError::from)?;
        let program = Program::Buffer(hx_formats::load_wav(&data)?);
        self.install(show, program)
    }

    fn install(&mut self, show: Show, program: Program) -> Result<(), ControlError> {
        let session = build_session(&show, &program, self.output.sample_rate())?;
        self.stop();
        self.pending = 0..0;
        let waveform = Waveform::from_program(&program, WAVEFORM_BUCKETS);
        self.timer = TimeUpdateTimer::new(show.config.time_update_interval);
        info!(title = %show.title, "show opened");
        self.loaded = Some(Loaded {
            show,
            program,
            waveform,
            session,
        });
        Ok(())
    }

    pub fn show(&self) -> Option<&Show> {
        self.loaded.as_ref().map(|l| &l.show)
    }

    pub fn program(&self) -> Option<&Program> {
        self.loaded.as_ref().map(|l| &l.program)
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.loaded.as_ref().map(|l| &l.waveform)
    }

    pub fn session(&self) -> Option<&Session<PannerBank>> {
        self.loaded.as_ref().map(|l| &l.session)
    }

    // --- Transport ---

    pub fn play(&mut self) -> Result<(), ControlError> {
        let loaded = self.loaded.as_mut().ok_or(ControlError::NoShow)?;
        if loaded.session.is_finished() {
            loaded.session.seek(0.0);
        }
        self.output.start()?;
        self.timer.fire_next();
        self.playing = true;
        info!("play");
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        if let Err(e) = self.output.stop() {
            warn!(error = %e, "audio stop failed");
        }
        self.playing = false;
        info!("stop");
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.session().is_some_and(|s| s.is_finished())
    }

    /// Jump to `time` seconds; the schedule is resolved there immediately.
    pub fn seek(&mut self, time: f64) -> Result<(), ControlError> {
        let loaded = self.loaded.as_mut().ok_or(ControlError::NoShow)?;
        loaded.session.seek(time);
        self.pending = 0..0;
        Ok(())
    }

    /// Media speed. Cue lookup follows media time; ramps keep their length
    /// on the audio clock.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<(), ControlError> {
        let loaded = self.loaded.as_mut().ok_or(ControlError::NoShow)?;
        loaded.session.set_playback_rate(rate);
        Ok(())
    }

    pub fn playback_rate(&self) -> f64 {
        self.session().map_or(1.0, |s| s.clock().playback_rate())
    }

    /// Render as much audio as the output can take right now, firing time
    /// updates at the show's cadence. Returns the frames written.
    ///
    /// The clock only runs ahead of the output by frames that are held
    /// here: if the output takes part of a block, the rest goes out first
    /// on the next call.
    pub fn pump(&mut self) -> usize {
        if !self.playing {
            return 0;
        }
        let Some(loaded) = self.loaded.as_mut() else {
            return 0;
        };
        let mut written = 0;
        if !self.pending.is_empty() {
            let accepted = self.output.write(&self.scratch[self.pending.clone()]);
            written += accepted;
            self.pending.start += accepted;
            if !self.pending.is_empty() {
                return written;
            }
        }
        let mut remaining = self.output.vacant();
        while remaining > 0 && !loaded.session.is_finished() {
            if self.timer.due(loaded.session.clock().audio_time()) {
                loaded.session.on_time_update();
            }
            let n = remaining.min(CHUNK);
            let block = &mut self.scratch[..n];
            loaded.session.render_block(&loaded.program, block);
            let accepted = self.output.write(block);
            written += accepted;
            remaining -= n;
            if accepted < n {
                debug!(held = n - accepted, "short write");
                self.pending = accepted..n;
                break;
            }
        }
        if loaded.session.is_finished() && self.pending.is_empty() {
            loaded.session.on_time_update();
            self.stop();
            info!("playback finished");
        }
        written
    }

    // --- Frame and input ---

    /// Animation frame: advance rotation and return the fresh snapshot.
    pub fn animation_frame(&mut self) -> Option<&FrameSnapshot> {
        self.loaded.as_mut().map(|l| l.session.animation_frame())
    }

    pub fn apply_input(&mut self, event: InputEvent) -> Option<Orientation> {
        self.loaded.as_mut()?.session.apply_input(event)
    }

    pub fn set_speaker_gain(&mut self, speaker: usize, value: f32) -> bool {
        self.loaded
            .as_mut()
            .is_some_and(|l| l.session.set_speaker_gain(speaker, value))
    }

    pub fn move_speaker(&mut self, speaker: usize, position: Vec3) -> bool {
        self.loaded
            .as_mut()
            .is_some_and(|l| l.session.move_speaker(speaker, position))
    }

    pub fn snapshot(&self) -> Option<&FrameSnapshot> {
        self.session().map(|s| s.snapshot())
    }

    // --- Offline rendering ---

    /// Render the loaded show from the start into a 16-bit WAV.
    pub fn render_to_wav(&self, sample_rate: u32, max_seconds: f64) -> Result<Vec<u8>, ControlError> {
        let loaded = self.loaded.as_ref().ok_or(ControlError::NoShow)?;
        Ok(render_to_wav(&loaded.show, &loaded.program, sample_rate, max_seconds)?)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the default device, or a silent output if that fails.
fn open_default_output() -> Box<dyn AudioOutput> {
    let opened = CpalOutput::new().and_then(|(mut output, consumer)| {
        output.build_stream(consumer)?;
        Ok(output)
    });
    match opened {
        Ok(output) => Box::new(output),
        Err(e) => {
            warn!(error = %e, "no audio output; continuing silently");
            Box::new(NullOutput::new(48_000, 1024))
        }
    }
}

fn load_program_or_tone(path: &Path, show: &Show) -> Program {
    let decoded = std::fs::read(path)
        .map_err(FormatError::from)
        .and_then(|data| hx_formats::load_wav(&data));
    match decoded {
        Ok(buffer) => Program::Buffer(buffer),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "program track unavailable; using test tone");
            tone_for(show)
        }
    }
}

fn tone_for(show: &Show) -> Program {
    let last = show
        .schedule
        .cues()
        .last()
        .map_or(0.0, |c| c.timestamp);
    Program::Tone(TestTone::new(last + TONE_TAIL))
}

pub(crate) fn build_session(
    show: &Show,
    program: &Program,
    sample_rate: u32,
) -> Result<Session<PannerBank>, ConfigError> {
    Session::new(
        show.schedule.clone(),
        show.layout,
        show.routing.clone(),
        show.config.clone(),
        PannerBank::new(show.layout.count(), show.config.reference_distance),
        sample_rate,
        program.duration().unwrap_or(0.0),
    )
}
