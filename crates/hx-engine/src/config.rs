//! Engine tuning shared by the scheduler, graph and orientation controller.

use std::time::Duration;

use hx_ir::RampCurve;

/// Tuning constants for one session. Every field has a working default.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Length of a pattern transition on the audio clock.
    pub ramp: Duration,
    pub curve: RampCurve,
    /// Degrees of rotation per pixel of pointer drag.
    pub drag_sensitivity: f32,
    /// Degrees per animation tick while a rotate key is held.
    pub key_rate: f32,
    /// Degrees per tick at full joystick deflection.
    pub joystick_rate: f32,
    /// Joystick displacement (fraction of radius) below which input is ignored.
    pub joystick_dead_zone: f32,
    /// Per-tick velocity multiplier after the joystick is released.
    pub joystick_decay: f32,
    /// Decaying velocity below this snaps to zero.
    pub velocity_epsilon: f32,
    /// Host cadence of media time updates.
    pub time_update_interval: Duration,
    /// Distance (m) inside which the spatializer applies no attenuation.
    pub reference_distance: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ramp: Duration::from_millis(100),
            curve: RampCurve::Linear,
            drag_sensitivity: 0.3,
            key_rate: 2.0,
            joystick_rate: 3.0,
            joystick_dead_zone: 0.2,
            joystick_decay: 0.9,
            velocity_epsilon: 0.01,
            time_update_interval: Duration::from_millis(50),
            reference_distance: 1.0,
        }
    }
}
