//! The explicit context object that owns every piece of runtime state.
//!
//! A `Session` is driven from one loop by three kinds of calls: media time
//! updates, animation frames, and input events. Each call finishes all of
//! its state changes and publishes a fresh snapshot before it returns, so
//! the order in which the drivers fire never exposes a torn state.

use hx_ir::{ConfigError, GainRouting, Orientation, Schedule, SpeakerLayout, Vec3};
use tracing::{debug, info};

use crate::clock::{MediaClock, SampleClock};
use crate::config::EngineConfig;
use crate::frame::Frame;
use crate::graph::SpatialGraph;
use crate::orientation::{InputEvent, OrientationController};
use crate::panner::PannerBank;
use crate::program::ProgramSource;
use crate::scheduler::{PatternScheduler, TimeUpdate};
use crate::snapshot::{FrameSnapshot, VisualSync};
use crate::spatializer::Spatializer;

pub struct Session<S: Spatializer> {
    clock: SampleClock,
    scheduler: PatternScheduler,
    graph: SpatialGraph<S>,
    orientation: OrientationController,
    sync: VisualSync,
    layout: SpeakerLayout,
    config: EngineConfig,
}

impl<S: Spatializer> Session<S> {
    /// Wire up a session. Fails if the schedule, layout and routing table
    /// disagree on the speaker count.
    pub fn new(
        schedule: Schedule,
        layout: SpeakerLayout,
        routing: GainRouting,
        config: EngineConfig,
        spatializer: S,
        sample_rate: u32,
        duration: f64,
    ) -> Result<Self, ConfigError> {
        if schedule.speaker_count() != layout.count() {
            return Err(ConfigError::LayoutMismatch {
                schedule: schedule.speaker_count(),
                layout: layout.count(),
            });
        }
        let graph = SpatialGraph::new(&layout, routing, config.curve, spatializer)?;
        info!(
            cues = schedule.len(),
            speakers = layout.count(),
            duration,
            "session ready"
        );
        let mut session = Self {
            clock: SampleClock::new(sample_rate, duration),
            scheduler: PatternScheduler::new(schedule, config.ramp),
            graph,
            orientation: OrientationController::new(&config),
            sync: VisualSync::new(),
            layout,
            config,
        };
        session.publish();
        Ok(session)
    }

    /// Media clock "time changed" handler.
    pub fn on_time_update(&mut self) -> TimeUpdate {
        let time = self.clock.current_time();
        let now = self.clock.audio_time();
        let update = self.scheduler.on_time_update(time, now, &mut self.graph);
        self.graph.sync_gains(now);
        self.publish();
        update
    }

    /// Animation frame handler: advance rotation sources by one tick and
    /// refresh the snapshot.
    pub fn animation_frame(&mut self) -> &FrameSnapshot {
        if let Some(orientation) = self.orientation.tick() {
            self.graph.set_listener_orientation(orientation);
        }
        self.graph.sync_gains(self.clock.audio_time());
        self.publish();
        self.sync.snapshot()
    }

    /// Input handler. A rotation reaches the audio graph and the snapshot
    /// before this returns.
    pub fn apply_input(&mut self, event: InputEvent) -> Option<Orientation> {
        let changed = self.orientation.handle(event)?;
        self.graph.set_listener_orientation(changed);
        self.publish();
        Some(changed)
    }

    /// Jump to `time` and resolve the schedule there immediately.
    pub fn seek(&mut self, time: f64) -> TimeUpdate {
        self.clock.seek(time);
        info!(time = self.clock.current_time(), "seek");
        self.on_time_update()
    }

    /// Direct gain control. Ramps like a pattern change; the next pattern
    /// change overrides it.
    pub fn set_speaker_gain(&mut self, speaker: usize, value: f32) -> bool {
        let now = self.clock.audio_time();
        let applied = self
            .graph
            .set_target_gain(speaker, value, self.config.ramp, now);
        if applied {
            self.publish();
        }
        applied
    }

    /// Drag a speaker to `position`. Only movable layouts accept this.
    pub fn move_speaker(&mut self, speaker: usize, position: Vec3) -> bool {
        if !self.layout.is_movable() {
            debug!(speaker, "layout is fixed; speaker move ignored");
            return false;
        }
        let moved = self.graph.set_speaker_position(speaker, position);
        if moved {
            self.publish();
        }
        moved
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.clock.set_playback_rate(rate);
    }

    /// Advance the clock by `frames` without rendering audio.
    pub fn advance(&mut self, frames: u64) {
        self.clock.advance(frames);
    }

    pub fn snapshot(&self) -> &FrameSnapshot {
        self.sync.snapshot()
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    pub fn scheduler(&self) -> &PatternScheduler {
        &self.scheduler
    }

    pub fn schedule(&self) -> &Schedule {
        self.scheduler.schedule()
    }

    pub fn graph(&self) -> &SpatialGraph<S> {
        &self.graph
    }

    pub fn orientation(&self) -> &OrientationController {
        &self.orientation
    }

    pub fn layout(&self) -> &SpeakerLayout {
        &self.layout
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    fn publish(&mut self) {
        let now = self.clock.audio_time();
        let speakers = self.graph.speakers();
        let snapshot = FrameSnapshot {
            seq: 0,
            playback_time: self.clock.current_time(),
            audio_time: now,
            duration: self.clock.duration(),
            active_cue: self.scheduler.active_cue(),
            active_pattern: self.scheduler.active_pattern(),
            gains: (0..speakers.len())
                .map(|i| self.graph.gain_at(i, now).unwrap_or(0.0))
                .collect(),
            targets: (0..speakers.len())
                .map(|i| self.graph.target_gain(i).unwrap_or(0.0))
                .collect(),
            positions: speakers.iter().map(|s| s.position()).collect(),
            orientation: self.orientation.angle(),
        };
        self.sync.publish(snapshot);
    }
}

impl Session<PannerBank> {
    /// Render one stereo frame of `program` through the panner bank and
    /// advance the clock. Never allocates.
    pub fn render_frame(&mut self, program: &impl ProgramSource) -> Frame {
        let input = program.sample_at(self.clock.current_time());
        let frame = self.graph.spatializer().render(input, self.clock.audio_time());
        self.clock.advance(1);
        frame
    }

    /// Fill `out` with consecutive frames.
    pub fn render_block(&mut self, program: &impl ProgramSource, out: &mut [Frame]) {
        for slot in out.iter_mut() {
            *slot = self.render_frame(program);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::RotateKey;
    use crate::program::TestTone;
    use crate::snapshot::SnapshotView;

    fn session(layout: SpeakerLayout) -> Session<PannerBank> {
        let count = layout.count();
        let presets: Vec<Vec<f32>> = (0..2)
            .map(|p| (0..count).map(|i| if i == p { 1.0 } else { 0.0 }).collect())
            .collect();
        let schedule = Schedule::new(&[0.0, 1.0], &presets, count).unwrap();
        Session::new(
            schedule,
            layout,
            GainRouting::identity(count),
            EngineConfig::default(),
            PannerBank::new(count, 1.0),
            1000,
            4.0,
        )
        .unwrap()
    }

    #[test]
    fn layout_mismatch_is_rejected() {
        let schedule = Schedule::new(&[0.0], &[[1.0f32, 0.0]], 2).unwrap();
        let r = Session::new(
            schedule,
            SpeakerLayout::hexagon(),
            GainRouting::identity(6),
            EngineConfig::default(),
            PannerBank::new(6, 1.0),
            1000,
            1.0,
        );
        assert!(matches!(
            r,
            Err(ConfigError::LayoutMismatch { schedule: 2, layout: 6 })
        ));
    }

    #[test]
    fn seek_publishes_new_pattern() {
        let mut s = session(SpeakerLayout::hexagon());
        let update = s.seek(1.5);
        assert_eq!(update.cue, 1);
        let snap = s.snapshot();
        assert_eq!(snap.active_cue, Some(1));
        assert_eq!(snap.active_pattern(), Some(1));
        assert_eq!(snap.targets[1], 1.0);
        assert_eq!(snap.playback_time(), 1.5);
    }

    #[test]
    fn input_rotation_reaches_graph_and_snapshot() {
        let mut s = session(SpeakerLayout::hexagon());
        s.apply_input(InputEvent::PointerDown { inside: true });
        let o = s.apply_input(InputEvent::PointerMove { dx: 300.0 }).unwrap();
        assert_eq!(s.graph().listener_orientation(), o);
        assert_eq!(s.snapshot().orientation(), o);
    }

    #[test]
    fn animation_frame_applies_held_keys() {
        let mut s = session(SpeakerLayout::hexagon());
        s.apply_input(InputEvent::KeyDown(RotateKey::Right));
        let seq = s.snapshot().seq;
        let snap = s.animation_frame();
        assert!((snap.orientation.degrees() - 2.0).abs() < 1e-5);
        assert!(snap.seq > seq);
    }

    #[test]
    fn fixed_layout_rejects_speaker_move() {
        let mut s = session(SpeakerLayout::hexagon());
        assert!(!s.move_speaker(0, Vec3::new(1.0, 0.0, 0.0)));
        let mut s = session(SpeakerLayout::octagon());
        assert!(s.move_speaker(0, Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(s.snapshot().speaker_position(0), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn render_advances_both_clocks() {
        let mut s = session(SpeakerLayout::hexagon());
        s.on_time_update();
        let tone = TestTone::new(4.0);
        let mut block = [Frame::silence(); 500];
        s.render_block(&tone, &mut block);
        assert!((s.clock().audio_time() - 0.5).abs() < 1e-9);
        assert!((s.clock().current_time() - 0.5).abs() < 1e-9);
        assert!(block.iter().any(|f| !f.is_silent()));
    }

    #[test]
    fn direct_gain_is_overridden_by_next_pattern() {
        let mut s = session(SpeakerLayout::hexagon());
        s.on_time_update();
        assert!(s.set_speaker_gain(5, 1.0));
        assert_eq!(s.graph().target_gain(5), Some(1.0));
        s.seek(1.2);
        assert_eq!(s.graph().target_gain(5), Some(0.0));
        assert!(!s.set_speaker_gain(6, 1.0));
    }

    #[test]
    fn snapshot_reports_library_pattern_for_reused_cues() {
        use hx_ir::Cue;
        let cues = [
            Cue { timestamp: 0.0, pattern: 1 },
            Cue { timestamp: 1.0, pattern: 0 },
        ];
        let schedule = Schedule::from_cues(&[[1.0f32, 0.0], [0.0, 1.0]], &cues, 2).unwrap();
        let layout = SpeakerLayout::ring(2, 3.0, 0.0, 0.0).unwrap();
        let mut s = Session::new(
            schedule,
            layout,
            GainRouting::identity(2),
            EngineConfig::default(),
            PannerBank::new(2, 1.0),
            1000,
            2.0,
        )
        .unwrap();

        s.seek(0.5);
        let snap = s.snapshot();
        assert_eq!(snap.active_cue, Some(0));
        assert_eq!(snap.active_pattern(), Some(1));
        assert_eq!(snap.targets.as_slice(), &[0.0, 1.0]);

        s.seek(1.5);
        assert_eq!(s.snapshot().active_cue, Some(1));
        assert_eq!(s.snapshot().active_pattern(), Some(0));
    }

    #[test]
    fn ramp_length_ignores_playback_rate() {
        let mut s = session(SpeakerLayout::hexagon());
        s.set_playback_rate(2.0);
        s.on_time_update();
        // 500 audio frames at double speed reach the cue at 1 s.
        s.advance(500);
        assert!((s.clock().current_time() - 1.0).abs() < 1e-9);
        let update = s.on_time_update();
        assert_eq!(update.cue, 1);

        let start = s.clock().audio_time();
        s.advance(50);
        let half = s.graph().gain_at(1, s.clock().audio_time()).unwrap();
        assert!((half - 0.5).abs() < 1e-3);
        s.advance(50);
        assert!((s.clock().audio_time() - start - 0.1).abs() < 1e-9);
        let full = s.graph().gain_at(1, s.clock().audio_time()).unwrap();
        assert!((full - 1.0).abs() < 1e-3);
    }
}
