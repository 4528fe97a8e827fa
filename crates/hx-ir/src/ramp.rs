//! Gain ramps anchored to the audio clock.
//!
//! A ramp never stores its current value. The value is re-derived from the
//! audio time on every read, so dropped or late frames cannot accumulate
//! drift and an expired ramp simply reads as its target.

/// Shape of a gain transition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RampCurve {
    /// Straight line from start to target.
    #[default]
    Linear,
    /// Exponential curve. 0.0 = linear, >0 = starts slow, <0 = starts fast.
    Exponential(f32),
}

/// Interpolate between two values using the given curve at position `t` (0.0..=1.0).
pub fn interpolate(curve: RampCurve, from: f32, to: f32, t: f32) -> f32 {
    let factor = match curve {
        RampCurve::Linear => t,
        RampCurve::Exponential(k) => {
            if k.abs() < 1e-6 {
                t
            } else {
                (libm::expf(k * t) - 1.0) / (libm::expf(k) - 1.0)
            }
        }
    };
    from + (to - from) * factor
}

/// An in-flight interpolation of one speaker's gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionRamp {
    pub from: f32,
    pub to: f32,
    /// Audio time (seconds) the ramp starts.
    pub start: f64,
    /// Audio time (seconds) the ramp reaches `to`.
    pub end: f64,
    pub curve: RampCurve,
}

impl TransitionRamp {
    /// A ramp that has already settled at `value`.
    pub fn settled(value: f32) -> Self {
        let value = value.clamp(0.0, 1.0);
        Self {
            from: value,
            to: value,
            start: 0.0,
            end: 0.0,
            curve: RampCurve::Linear,
        }
    }

    /// Ramp from `from` to `to` starting at `start` and lasting `duration` seconds.
    pub fn new(from: f32, to: f32, start: f64, duration: f64, curve: RampCurve) -> Self {
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            start,
            end: start + duration.max(0.0),
            curve,
        }
    }

    /// `(now - start) / (end - start)` clamped to [0, 1].
    pub fn progress(&self, now: f64) -> f32 {
        if self.end <= self.start {
            return 1.0;
        }
        ((now - self.start) / (self.end - self.start)).clamp(0.0, 1.0) as f32
    }

    /// Gain at audio time `now`, always within [0, 1].
    pub fn value_at(&self, now: f64) -> f32 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        interpolate(self.curve, self.from, self.to, t).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self, now: f64) -> bool {
        now >= self.end
    }
}
