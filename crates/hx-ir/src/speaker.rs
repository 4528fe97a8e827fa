//! Virtual speaker slots and their fixed angular layout.

use alloc::vec::Vec;

use crate::error::ConfigError;
use crate::orientation::Orientation;
use crate::pattern::MAX_SPEAKERS;
use crate::vec3::Vec3;

/// One fixed virtual sound emitter.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerSlot {
    index: usize,
    position: Vec3,
    orientation: Vec3,
    gain: f32,
}

impl SpeakerSlot {
    pub fn new(index: usize, position: Vec3, listener: Vec3) -> Self {
        Self {
            index,
            position,
            orientation: facing(position, listener),
            gain: 0.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Position in meters relative to room center.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit vector pointing from the speaker toward the listener.
    pub fn orientation(&self) -> Vec3 {
        self.orientation
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    /// Move the speaker and re-aim it at the listener.
    pub fn move_to(&mut self, position: Vec3, listener: Vec3) {
        self.position = position;
        self.orientation = facing(position, listener);
    }

    /// Horizontal angle of the speaker around the room center, in degrees,
    /// using the same convention as `Orientation`.
    pub fn azimuth(&self) -> f32 {
        let deg = libm::atan2f(self.position.x, -self.position.z).to_degrees();
        Orientation::from_degrees(deg).degrees()
    }
}

/// Unit vector from `position` toward `listener`. A speaker sitting on the
/// listener points back toward the front wall.
fn facing(position: Vec3, listener: Vec3) -> Vec3 {
    (listener - position)
        .normalized()
        .unwrap_or(Vec3::new(0.0, 0.0, 1.0))
}

/// Ring of equally spaced speakers around the listener.
///
/// Slot `i` sits at `start_angle + i * 360 / count` degrees, clockwise seen
/// from above, 0 = front.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeakerLayout {
    count: usize,
    radius: f32,
    height: f32,
    start_angle: f32,
    movable: bool,
}

impl SpeakerLayout {
    pub fn ring(count: usize, radius: f32, height: f32, start_angle: f32) -> Result<Self, ConfigError> {
        if count == 0 || count > MAX_SPEAKERS {
            return Err(ConfigError::SpeakerCount { count });
        }
        if !(radius.is_finite() && radius > 0.0 && height.is_finite() && start_angle.is_finite()) {
            return Err(ConfigError::InvalidGeometry);
        }
        Ok(Self {
            count,
            radius,
            height,
            start_angle,
            movable: false,
        })
    }

    /// The standard six-speaker ring, 3 m radius at ear height.
    pub fn hexagon() -> Self {
        Self {
            count: 6,
            radius: 3.0,
            height: 0.0,
            start_angle: 0.0,
            movable: false,
        }
    }

    /// The eight-speaker premiere ring; speakers may be dragged.
    pub fn octagon() -> Self {
        Self {
            count: 8,
            radius: 3.0,
            height: 0.0,
            start_angle: 0.0,
            movable: true,
        }
    }

    pub fn with_movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    /// Angle of slot `index` in degrees.
    pub fn slot_angle(&self, index: usize) -> f32 {
        Orientation::from_degrees(self.start_angle + index as f32 * 360.0 / self.count as f32)
            .degrees()
    }

    pub fn slot_position(&self, index: usize) -> Vec3 {
        let rad = self.slot_angle(index).to_radians();
        Vec3::new(
            self.radius * libm::sinf(rad),
            self.height,
            -self.radius * libm::cosf(rad),
        )
    }

    /// Build the speaker slots aimed at `listener`.
    pub fn build_slots(&self, listener: Vec3) -> Vec<SpeakerSlot> {
        (0..self.count)
            .map(|i| SpeakerSlot::new(i, self.slot_position(i), listener))
            .collect()
    }
}
