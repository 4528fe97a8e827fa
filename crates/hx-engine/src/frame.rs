//! Stereo output frame.

/// A stereo audio frame, nominally in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    pub const fn silence() -> Self {
        Self { left: 0.0, right: 0.0 }
    }

    pub fn mix(&mut self, other: Frame) {
        self.left += other.left;
        self.right += other.right;
    }

    /// Convert to 16-bit PCM with hard clipping.
    pub fn to_i16(self) -> (i16, i16) {
        (to_pcm16(self.left), to_pcm16(self.right))
    }

    pub fn is_silent(self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_sums_channels() {
        let mut a = Frame { left: 0.25, right: -0.5 };
        a.mix(Frame { left: 0.25, right: 0.25 });
        assert_eq!(a, Frame { left: 0.5, right: -0.25 });
    }

    #[test]
    fn pcm_conversion_clips() {
        let f = Frame { left: 2.0, right: -2.0 };
        assert_eq!(f.to_i16(), (32767, -32767));
        assert_eq!(Frame::silence().to_i16(), (0, 0));
    }
}
