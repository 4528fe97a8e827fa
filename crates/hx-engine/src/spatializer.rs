//! The audio spatialization primitive the graph drives.
//!
//! A spatializer owns one gain node per speaker plus a single listener. The
//! graph is its only caller; all audible side effects go through this trait.

use hx_ir::{TransitionRamp, Vec3};

/// Listener placement in room coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListenerPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl Default for ListenerPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::UP,
        }
    }
}

pub trait Spatializer {
    /// Place gain node `node` at `position`, emitting along `orientation`.
    fn set_node_pose(&mut self, node: usize, position: Vec3, orientation: Vec3);

    /// Replace the gain automation of `node` with `ramp`. Ramp times are
    /// audio-clock seconds.
    fn schedule_gain(&mut self, node: usize, ramp: TransitionRamp);

    fn set_listener(&mut self, pose: ListenerPose);
}
