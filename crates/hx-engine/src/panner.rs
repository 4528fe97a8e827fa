//! Software spatializer: equal-power stereo panning per gain node.
//!
//! Each node's pan is derived from its bearing relative to the listener's
//! right vector and cached whenever a pose changes, so the per-sample render
//! path only evaluates gain ramps and never allocates.

use std::f32::consts::FRAC_PI_4;

use hx_ir::{TransitionRamp, Vec3};

use crate::frame::Frame;
use crate::spatializer::{ListenerPose, Spatializer};

#[derive(Clone, Debug)]
struct PannerNode {
    position: Vec3,
    orientation: Vec3,
    ramp: TransitionRamp,
    /// Cached (left, right) gains including distance attenuation.
    pan: (f32, f32),
}

/// A bank of panner nodes sharing one listener.
#[derive(Clone, Debug)]
pub struct PannerBank {
    nodes: Vec<PannerNode>,
    listener: ListenerPose,
    reference_distance: f32,
}

impl PannerBank {
    pub fn new(node_count: usize, reference_distance: f32) -> Self {
        let node = PannerNode {
            position: Vec3::ZERO,
            orientation: Vec3::new(0.0, 0.0, 1.0),
            ramp: TransitionRamp::settled(0.0),
            pan: stereo_pan(0.0),
        };
        Self {
            nodes: vec![node; node_count],
            listener: ListenerPose::default(),
            reference_distance: reference_distance.max(f32::EPSILON),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Gain of `node` at audio time `now`.
    pub fn node_gain(&self, node: usize, now: f64) -> Option<f32> {
        self.nodes.get(node).map(|n| n.ramp.value_at(now))
    }

    /// Cached (left, right) panning gains of `node`.
    pub fn node_pan(&self, node: usize) -> Option<(f32, f32)> {
        self.nodes.get(node).map(|n| n.pan)
    }

    pub fn node_orientation(&self, node: usize) -> Option<Vec3> {
        self.nodes.get(node).map(|n| n.orientation)
    }

    pub fn listener(&self) -> ListenerPose {
        self.listener
    }

    /// Spatialize one mono program sample fed to every node.
    pub fn render(&self, input: f32, now: f64) -> Frame {
        let mut out = Frame::silence();
        for node in &self.nodes {
            let gain = node.ramp.value_at(now);
            if gain <= 0.0 {
                continue;
            }
            let s = input * gain;
            out.mix(Frame {
                left: s * node.pan.0,
                right: s * node.pan.1,
            });
        }
        out
    }

    fn refresh_pan(&mut self, index: usize) {
        let listener = self.listener;
        let reference = self.reference_distance;
        if let Some(node) = self.nodes.get_mut(index) {
            node.pan = node_pan(node.position, &listener, reference);
        }
    }
}

impl Spatializer for PannerBank {
    fn set_node_pose(&mut self, node: usize, position: Vec3, orientation: Vec3) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.position = position;
            n.orientation = orientation;
        }
        self.refresh_pan(node);
    }

    fn schedule_gain(&mut self, node: usize, ramp: TransitionRamp) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.ramp = ramp;
        }
    }

    fn set_listener(&mut self, pose: ListenerPose) {
        self.listener = pose;
        for i in 0..self.nodes.len() {
            self.refresh_pan(i);
        }
    }
}

/// Equal-power stereo panning.
/// `pan` ranges from -1.0 (full left) to 1.0 (full right).
fn stereo_pan(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

/// Inverse-distance attenuation, unity inside `reference`.
fn distance_attenuation(distance: f32, reference: f32) -> f32 {
    if distance <= reference {
        1.0
    } else {
        reference / distance
    }
}

fn node_pan(position: Vec3, listener: &ListenerPose, reference: f32) -> (f32, f32) {
    let offset = position - listener.position;
    let Some(direction) = offset.normalized() else {
        return stereo_pan(0.0);
    };
    let right = listener
        .forward
        .cross(listener.up)
        .normalized()
        .unwrap_or(Vec3::new(1.0, 0.0, 0.0));
    let (l, r) = stereo_pan(direction.dot(right));
    let att = distance_attenuation(offset.length(), reference);
    (l * att, r * att)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hx_ir::{Orientation, RampCurve};

    fn bank_with_node_at(position: Vec3) -> PannerBank {
        let mut bank = PannerBank::new(1, 10.0);
        bank.set_node_pose(0, position, Vec3::ZERO);
        bank.schedule_gain(0, TransitionRamp::settled(1.0));
        bank
    }

    #[test]
    fn front_source_is_centered() {
        let bank = bank_with_node_at(Vec3::new(0.0, 0.0, -3.0));
        let (l, r) = bank.node_pan(0).unwrap();
        assert!((l - r).abs() < 1e-5);
        // Equal power: l² + r² = 1
        assert!((l * l + r * r - 1.0).abs() < 1e-5);
    }

    #[test]
    fn right_source_pans_right() {
        let bank = bank_with_node_at(Vec3::new(3.0, 0.0, 0.0));
        let (l, r) = bank.node_pan(0).unwrap();
        assert!(r > 0.99);
        assert!(l < 0.01);
    }

    #[test]
    fn turning_listener_moves_image() {
        let mut bank = bank_with_node_at(Vec3::new(3.0, 0.0, 0.0));
        // Face the source: it should now be centered.
        bank.set_listener(ListenerPose {
            forward: Orientation::from_degrees(90.0).forward(),
            ..ListenerPose::default()
        });
        let (l, r) = bank.node_pan(0).unwrap();
        assert!((l - r).abs() < 1e-4);
    }

    #[test]
    fn distant_source_is_attenuated() {
        let mut bank = PannerBank::new(1, 1.0);
        bank.set_node_pose(0, Vec3::new(0.0, 0.0, -4.0), Vec3::ZERO);
        let (l, r) = bank.node_pan(0).unwrap();
        assert!(((l * l + r * r).sqrt() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn render_follows_gain_ramp() {
        let mut bank = bank_with_node_at(Vec3::new(0.0, 0.0, -3.0));
        bank.schedule_gain(0, TransitionRamp::new(0.0, 1.0, 0.0, 1.0, RampCurve::Linear));
        let quiet = bank.render(1.0, 0.1);
        let loud = bank.render(1.0, 0.9);
        assert!(loud.left > quiet.left);
        assert!(bank.render(1.0, 0.0).is_silent());
    }

    #[test]
    fn unknown_node_is_ignored() {
        let mut bank = PannerBank::new(2, 1.0);
        bank.schedule_gain(5, TransitionRamp::settled(1.0));
        bank.set_node_pose(5, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(bank.node_gain(5, 0.0), None);
        assert_eq!(bank.node_count(), 2);
    }
}
