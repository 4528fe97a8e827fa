//! Per-frame state published for renderers.
//!
//! The session fills one `FrameSnapshot` after each handler and publishes it
//! whole. Renderers only ever read through `SnapshotView`, so the 3D scene,
//! the top-down map and the lane view never see scheduler internals or a
//! half-updated frame.

use arrayvec::ArrayVec;
use hx_ir::{Orientation, Vec3, MAX_SPEAKERS};

/// Read capability shared by every renderer.
pub trait SnapshotView {
    /// Library index of the pattern in effect, or `None` before the first
    /// update.
    fn active_pattern(&self) -> Option<usize>;
    fn speaker_gain(&self, speaker: usize) -> Option<f32>;
    fn speaker_position(&self, speaker: usize) -> Option<Vec3>;
    fn orientation(&self) -> Orientation;
    fn speaker_count(&self) -> usize;
    /// Media time in seconds.
    fn playback_time(&self) -> f64;
}

/// Complete view of the core state at one instant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameSnapshot {
    /// Publish counter; bumps on every publish.
    pub seq: u64,
    pub playback_time: f64,
    pub audio_time: f64,
    pub duration: f64,
    /// Cue active at `playback_time`.
    pub active_cue: Option<usize>,
    pub active_pattern: Option<usize>,
    /// Interpolated gains at `audio_time`.
    pub gains: ArrayVec<f32, MAX_SPEAKERS>,
    /// Ramp targets.
    pub targets: ArrayVec<f32, MAX_SPEAKERS>,
    pub positions: ArrayVec<Vec3, MAX_SPEAKERS>,
    pub orientation: Orientation,
}

impl SnapshotView for FrameSnapshot {
    fn active_pattern(&self) -> Option<usize> {
        self.active_pattern
    }

    fn speaker_gain(&self, speaker: usize) -> Option<f32> {
        self.gains.get(speaker).copied()
    }

    fn speaker_position(&self, speaker: usize) -> Option<Vec3> {
        self.positions.get(speaker).copied()
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn speaker_count(&self) -> usize {
        self.gains.len()
    }

    fn playback_time(&self) -> f64 {
        self.playback_time
    }
}

/// Holder of the latest published snapshot.
#[derive(Clone, Debug, Default)]
pub struct VisualSync {
    current: FrameSnapshot,
}

impl VisualSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot in one step. The sequence number is
    /// assigned here.
    pub fn publish(&mut self, mut snapshot: FrameSnapshot) {
        snapshot.seq = self.current.seq + 1;
        self.current = snapshot;
    }

    /// The most recently published snapshot. Never recomputes anything.
    pub fn snapshot(&self) -> &FrameSnapshot {
        &self.current
    }
}

/// Placement of one speaker for the scene and map renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeakerTransform {
    /// Top-down map coordinates in meters: x right, y toward the back wall.
    pub map: (f32, f32),
    pub world: Vec3,
    /// Emissive intensity, equal to the speaker gain.
    pub intensity: f32,
}

/// Render transforms derived from a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneTransforms {
    /// Camera rotation about the vertical axis, radians, clockwise from front.
    pub camera_yaw: f32,
    /// Unit direction of the listener arrow on the map (x right, y down).
    pub arrow: (f32, f32),
    pub speakers: ArrayVec<SpeakerTransform, MAX_SPEAKERS>,
}

impl SceneTransforms {
    pub fn from_view(view: &impl SnapshotView) -> Self {
        let orientation = view.orientation();
        let forward = orientation.forward();
        let speakers = (0..view.speaker_count().min(MAX_SPEAKERS))
            .map(|i| {
                let world = view.speaker_position(i).unwrap_or(Vec3::ZERO);
                SpeakerTransform {
                    map: (world.x, world.z),
                    world,
                    intensity: view.speaker_gain(i).unwrap_or(0.0),
                }
            })
            .collect();
        Self {
            camera_yaw: orientation.radians(),
            arrow: (forward.x, forward.z),
            speakers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A renderer-side fake proving the narrow interface is enough.
    struct Fixed;

    impl SnapshotView for Fixed {
        fn active_pattern(&self) -> Option<usize> {
            Some(3)
        }
        fn speaker_gain(&self, speaker: usize) -> Option<f32> {
            (speaker < 2).then_some(if speaker == 1 { 0.5 } else { 0.0 })
        }
        fn speaker_position(&self, speaker: usize) -> Option<Vec3> {
            (speaker < 2).then_some(Vec3::new(speaker as f32, 0.0, -3.0))
        }
        fn orientation(&self) -> Orientation {
            Orientation::from_degrees(90.0)
        }
        fn speaker_count(&self) -> usize {
            2
        }
        fn playback_time(&self) -> f64 {
            1.0
        }
    }

    #[test]
    fn publish_replaces_whole_snapshot() {
        let mut sync = VisualSync::new();
        assert_eq!(sync.snapshot().seq, 0);
        let mut snap = FrameSnapshot {
            playback_time: 2.0,
            active_pattern: Some(1),
            ..FrameSnapshot::default()
        };
        snap.gains.push(0.25);
        sync.publish(snap.clone());
        assert_eq!(sync.snapshot().seq, 1);
        assert_eq!(sync.snapshot().speaker_gain(0), Some(0.25));
        assert_eq!(sync.snapshot().active_pattern(), Some(1));
        sync.publish(snap);
        assert_eq!(sync.snapshot().seq, 2);
    }

    #[test]
    fn transforms_follow_view() {
        let t = SceneTransforms::from_view(&Fixed);
        assert!((t.camera_yaw - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((t.arrow.0 - 1.0).abs() < 1e-6);
        assert!(t.arrow.1.abs() < 1e-6);
        assert_eq!(t.speakers.len(), 2);
        assert_eq!(t.speakers[1].map, (1.0, -3.0));
        assert_eq!(t.speakers[1].intensity, 0.5);
    }

    #[test]
    fn out_of_range_speaker_reads_none() {
        let snap = FrameSnapshot::default();
        assert_eq!(snap.speaker_gain(7), None);
        assert_eq!(snap.speaker_count(), 0);
    }
}
