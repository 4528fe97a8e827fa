//! Speaker ownership and gain mediation.
//!
//! The graph maps logical speaker slots onto spatializer gain nodes (through
//! the routing table) and turns every gain change into a `TransitionRamp` on
//! the audio clock. A superseding ramp always starts from the value the old
//! one had reached, so gain never jumps.

use std::time::Duration;

use arrayvec::ArrayVec;
use hx_ir::{
    ConfigError, GainRouting, Orientation, RampCurve, SpeakerLayout, SpeakerSlot, TransitionRamp,
    Vec3, MAX_SPEAKERS,
};
use tracing::debug;

use crate::spatializer::{ListenerPose, Spatializer};

pub struct SpatialGraph<S: Spatializer> {
    speakers: Vec<SpeakerSlot>,
    ramps: ArrayVec<TransitionRamp, MAX_SPEAKERS>,
    routing: GainRouting,
    listener: Vec3,
    orientation: Orientation,
    curve: RampCurve,
    spatializer: S,
}

impl<S: Spatializer> SpatialGraph<S> {
    /// Build the speaker ring, place every gain node and face the listener
    /// forward. All speakers start silent.
    pub fn new(
        layout: &SpeakerLayout,
        routing: GainRouting,
        curve: RampCurve,
        spatializer: S,
    ) -> Result<Self, ConfigError> {
        if layout.count() == 0 || layout.count() > MAX_SPEAKERS {
            return Err(ConfigError::SpeakerCount { count: layout.count() });
        }
        if routing.len() != layout.count() {
            return Err(ConfigError::InvalidRouting {
                reason: "length differs from speaker count",
            });
        }
        let listener = Vec3::ZERO;
        let speakers = layout.build_slots(listener);
        let ramps = speakers.iter().map(|_| TransitionRamp::settled(0.0)).collect();
        let mut graph = Self {
            speakers,
            ramps,
            routing,
            listener,
            orientation: Orientation::default(),
            curve,
            spatializer,
        };
        for i in 0..graph.speakers.len() {
            graph.push_pose(i);
            if let Some(node) = graph.routing.node_for(i) {
                graph.spatializer.schedule_gain(node, graph.ramps[i]);
            }
        }
        graph.set_listener_orientation(Orientation::default());
        Ok(graph)
    }

    /// Ramp `speaker` toward `target` over `ramp`, starting at audio time
    /// `now`. Returns false (and changes nothing) for an unknown speaker or
    /// a non-finite target.
    pub fn set_target_gain(&mut self, speaker: usize, target: f32, ramp: Duration, now: f64) -> bool {
        let (Some(current), Some(node)) = (self.ramps.get(speaker), self.routing.node_for(speaker))
        else {
            debug!(speaker, "gain change for unknown speaker ignored");
            return false;
        };
        if !target.is_finite() {
            debug!(speaker, "non-finite gain target ignored");
            return false;
        }
        let start = current.value_at(now);
        if !current.is_complete(now) {
            debug!(speaker, from = start, to = target, "superseding in-flight ramp");
        }
        let next = TransitionRamp::new(start, target, now, ramp.as_secs_f64(), self.curve);
        self.ramps[speaker] = next;
        self.speakers[speaker].set_gain(start);
        self.spatializer.schedule_gain(node, next);
        true
    }

    /// Interpolated gain of `speaker` at audio time `now`.
    pub fn gain_at(&self, speaker: usize, now: f64) -> Option<f32> {
        self.ramps.get(speaker).map(|r| r.value_at(now))
    }

    /// Value the current ramp of `speaker` is heading to.
    pub fn target_gain(&self, speaker: usize) -> Option<f32> {
        self.ramps.get(speaker).map(|r| r.to)
    }

    pub fn ramp(&self, speaker: usize) -> Option<&TransitionRamp> {
        self.ramps.get(speaker)
    }

    /// Copy interpolated gains into the speaker slots.
    pub fn sync_gains(&mut self, now: f64) {
        for (slot, ramp) in self.speakers.iter_mut().zip(&self.ramps) {
            slot.set_gain(ramp.value_at(now));
        }
    }

    /// Move `speaker` and re-aim it at the listener. Only that speaker's
    /// node pose changes.
    pub fn set_speaker_position(&mut self, speaker: usize, position: Vec3) -> bool {
        if !position.is_finite() {
            debug!(speaker, "non-finite speaker position ignored");
            return false;
        }
        let listener = self.listener;
        let Some(slot) = self.speakers.get_mut(speaker) else {
            debug!(speaker, "move for unknown speaker ignored");
            return false;
        };
        slot.move_to(position, listener);
        self.push_pose(speaker);
        true
    }

    /// Point the listener along `orientation` on the horizontal plane.
    pub fn set_listener_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.spatializer.set_listener(ListenerPose {
            position: self.listener,
            forward: orientation.forward(),
            up: Vec3::UP,
        });
    }

    pub fn speaker(&self, index: usize) -> Option<&SpeakerSlot> {
        self.speakers.get(index)
    }

    pub fn speakers(&self) -> &[SpeakerSlot] {
        &self.speakers
    }

    pub fn speaker_count(&self) -> usize {
        self.speakers.len()
    }

    pub fn routing(&self) -> &GainRouting {
        &self.routing
    }

    pub fn listener_orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn spatializer(&self) -> &S {
        &self.spatializer
    }

    fn push_pose(&mut self, speaker: usize) {
        let (Some(slot), Some(node)) = (self.speakers.get(speaker), self.routing.node_for(speaker))
        else {
            return;
        };
        self.spatializer
            .set_node_pose(node, slot.position(), slot.orientation());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call the graph makes.
    #[derive(Default)]
    struct Recorder {
        poses: Vec<(usize, Vec3)>,
        gains: Vec<(usize, TransitionRamp)>,
        listener: Option<ListenerPose>,
    }

    impl Spatializer for Recorder {
        fn set_node_pose(&mut self, node: usize, position: Vec3, _orientation: Vec3) {
            self.poses.push((node, position));
        }
        fn schedule_gain(&mut self, node: usize, ramp: TransitionRamp) {
            self.gains.push((node, ramp));
        }
        fn set_listener(&mut self, pose: ListenerPose) {
            self.listener = Some(pose);
        }
    }

    fn graph() -> SpatialGraph<Recorder> {
        SpatialGraph::new(
            &SpeakerLayout::hexagon(),
            GainRouting::identity(6),
            RampCurve::Linear,
            Recorder::default(),
        )
        .unwrap()
    }

    const RAMP: Duration = Duration::from_millis(100);

    #[test]
    fn new_places_every_node_silent() {
        let g = graph();
        assert_eq!(g.spatializer().poses.len(), 6);
        assert_eq!(g.spatializer().gains.len(), 6);
        for i in 0..6 {
            assert_eq!(g.gain_at(i, 0.0), Some(0.0));
        }
        assert!(g.spatializer().listener.is_some());
    }

    #[test]
    fn routing_length_must_match_layout() {
        let r = SpatialGraph::new(
            &SpeakerLayout::hexagon(),
            GainRouting::identity(4),
            RampCurve::Linear,
            Recorder::default(),
        );
        assert!(matches!(r, Err(ConfigError::InvalidRouting { .. })));
    }

    #[test]
    fn ramp_reaches_target() {
        let mut g = graph();
        assert!(g.set_target_gain(2, 1.0, RAMP, 1.0));
        assert_eq!(g.gain_at(2, 1.0), Some(0.0));
        assert!((g.gain_at(2, 1.05).unwrap() - 0.5).abs() < 1e-4);
        assert_eq!(g.gain_at(2, 1.2), Some(1.0));
        assert_eq!(g.target_gain(2), Some(1.0));
    }

    #[test]
    fn superseding_ramp_starts_from_interpolated_value() {
        let mut g = graph();
        g.set_target_gain(0, 1.0, RAMP, 0.0);
        let at_40ms = g.gain_at(0, 0.04).unwrap();
        g.set_target_gain(0, 0.0, RAMP, 0.04);
        let b = g.ramp(0).unwrap();
        assert_eq!(b.from, at_40ms);
        assert_eq!(g.gain_at(0, 0.04), Some(at_40ms));
        assert_eq!(g.target_gain(0), Some(0.0));
    }

    #[test]
    fn routed_speaker_drives_permuted_node() {
        let mut g = SpatialGraph::new(
            &SpeakerLayout::hexagon(),
            GainRouting::from_table(&[3, 4, 5, 0, 1, 2], 6).unwrap(),
            RampCurve::Linear,
            Recorder::default(),
        )
        .unwrap();
        g.set_target_gain(1, 1.0, RAMP, 0.0);
        let (node, ramp) = *g.spatializer().gains.last().unwrap();
        assert_eq!(node, 4);
        assert_eq!(ramp.to, 1.0);
    }

    #[test]
    fn unknown_speaker_is_ignored() {
        let mut g = graph();
        let calls = g.spatializer().gains.len();
        assert!(!g.set_target_gain(6, 1.0, RAMP, 0.0));
        assert!(!g.set_target_gain(0, f32::NAN, RAMP, 0.0));
        assert_eq!(g.spatializer().gains.len(), calls);
        assert_eq!(g.gain_at(6, 0.0), None);
    }

    #[test]
    fn gain_targets_are_clamped() {
        let mut g = graph();
        g.set_target_gain(0, 3.0, Duration::ZERO, 0.0);
        assert_eq!(g.gain_at(0, 0.0), Some(1.0));
    }

    #[test]
    fn moving_speaker_reaims_it() {
        let mut g = graph();
        assert!(g.set_speaker_position(0, Vec3::new(2.0, 0.0, 0.0)));
        let slot = g.speaker(0).unwrap();
        assert_eq!(slot.position(), Vec3::new(2.0, 0.0, 0.0));
        assert!((slot.orientation().x + 1.0).abs() < 1e-6);
        assert_eq!(g.spatializer().poses.last().unwrap().0, 0);
        assert!(!g.set_speaker_position(9, Vec3::ZERO));
        assert!(!g.set_speaker_position(0, Vec3::new(f32::NAN, 0.0, 0.0)));
    }

    #[test]
    fn listener_orientation_sets_forward_vector() {
        let mut g = graph();
        g.set_listener_orientation(Orientation::from_degrees(90.0));
        let pose = g.spatializer().listener.unwrap();
        assert!((pose.forward.x - 1.0).abs() < 1e-6);
        assert!(pose.forward.z.abs() < 1e-6);
        assert_eq!(pose.up, Vec3::UP);
    }

    #[test]
    fn sync_gains_copies_into_slots() {
        let mut g = graph();
        g.set_target_gain(4, 1.0, RAMP, 0.0);
        g.sync_gains(0.05);
        assert!((g.speaker(4).unwrap().gain() - 0.5).abs() < 1e-4);
    }
}
