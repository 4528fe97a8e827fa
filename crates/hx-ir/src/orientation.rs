//! Listener facing angle.
//!
//! Degrees, clockwise seen from above, 0 = facing -Z (the front of the room).

use crate::vec3::Vec3;

/// Wrap any finite angle into [0, 360).
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut wrapped = libm::fmodf(angle, 360.0);
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    // -1e-6 + 360.0 rounds to 360.0 in f32
    if wrapped >= 360.0 {
        wrapped = 0.0;
    }
    wrapped
}

/// The listener's current facing angle, always wrapped to [0, 360).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation(f32);

impl Orientation {
    pub fn from_degrees(degrees: f32) -> Self {
        Self(wrap_degrees(degrees))
    }

    pub fn degrees(self) -> f32 {
        self.0
    }

    pub fn radians(self) -> f32 {
        self.0.to_radians()
    }

    /// Rotate by `delta` degrees and re-wrap.
    pub fn rotated(self, delta: f32) -> Self {
        Self::from_degrees(self.0 + delta)
    }

    /// Forward unit vector on the horizontal plane.
    pub fn forward(self) -> Vec3 {
        let rad = self.radians();
        Vec3::new(libm::sinf(rad), 0.0, -libm::cosf(rad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!((wrap_degrees(370.0) - 10.0).abs() < 1e-4);
        assert!((wrap_degrees(-10.0) - 350.0).abs() < 1e-4);
        assert!((wrap_degrees(-725.0) - 355.0).abs() < 1e-3);
    }

    #[test]
    fn tiny_negative_wraps_to_zero_not_360() {
        let w = wrap_degrees(-1e-6);
        assert!((0.0..360.0).contains(&w));
    }

    #[test]
    fn forward_at_zero_faces_front() {
        let f = Orientation::from_degrees(0.0).forward();
        assert!(f.x.abs() < 1e-6);
        assert!((f.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn forward_at_ninety_faces_right() {
        let f = Orientation::from_degrees(90.0).forward();
        assert!((f.x - 1.0).abs() < 1e-6);
        assert!(f.z.abs() < 1e-6);
    }

    #[test]
    fn rotated_wraps() {
        let o = Orientation::from_degrees(350.0).rotated(20.0);
        assert!((o.degrees() - 10.0).abs() < 1e-4);
    }
}
