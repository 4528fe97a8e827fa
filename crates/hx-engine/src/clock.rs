//! Playback clocks.
//!
//! Two timelines run side by side. *Media time* is the position in the
//! program: it can be seeked, scaled by a playback rate, and is what the
//! schedule is resolved against. *Audio time* is the monotonic count of
//! rendered frames; gain ramps are anchored to it so they keep their length
//! across seeks and rate changes.

use std::time::Duration;

/// Source of playback time for the scheduler.
pub trait MediaClock {
    /// Media position in seconds, within [0, duration].
    fn current_time(&self) -> f64;
    /// Total media length in seconds.
    fn duration(&self) -> f64;
    /// Jump to an arbitrary position (clamped to the media).
    fn seek(&mut self, time: f64);
    /// Monotonic audio-clock seconds; never jumps.
    fn audio_time(&self) -> f64;
}

/// Frame-counting clock driven by the render loop.
#[derive(Clone, Debug)]
pub struct SampleClock {
    sample_rate: u32,
    frames: u64,
    position: f64,
    duration: f64,
    rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: u32, duration: f64) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            frames: 0,
            position: 0.0,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            rate: 1.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Advance both timelines by `frames` rendered frames.
    pub fn advance(&mut self, frames: u64) {
        self.frames += frames;
        let dt = frames as f64 / self.sample_rate as f64;
        self.position = (self.position + dt * self.rate).min(self.duration);
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    /// Media seconds advanced per audio second, limited to [0.25, 4].
    pub fn set_playback_rate(&mut self, rate: f64) {
        if rate.is_finite() {
            self.rate = rate.clamp(0.25, 4.0);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.duration
    }
}

impl MediaClock for SampleClock {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek(&mut self, time: f64) {
        if time.is_finite() {
            self.position = time.clamp(0.0, self.duration);
        }
    }

    fn audio_time(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Fires at a fixed audio-time cadence, mimicking a host's throttled
/// "time changed" notification.
#[derive(Clone, Debug)]
pub struct TimeUpdateTimer {
    interval: f64,
    next: f64,
}

impl TimeUpdateTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.as_secs_f64(),
            next: 0.0,
        }
    }

    /// True once per elapsed interval. Missed intervals collapse into one.
    pub fn due(&mut self, audio_time: f64) -> bool {
        if audio_time < self.next {
            return false;
        }
        self.next = audio_time + self.interval;
        true
    }

    /// Make the next `due` call fire regardless of time.
    pub fn fire_next(&mut self) {
        self.next = f64::NEG_INFINITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_both_timelines() {
        let mut clock = SampleClock::new(100, 10.0);
        clock.advance(50);
        assert!((clock.current_time() - 0.5).abs() < 1e-9);
        assert!((clock.audio_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn seek_moves_media_time_only() {
        let mut clock = SampleClock::new(100, 10.0);
        clock.advance(100);
        clock.seek(7.0);
        assert_eq!(clock.current_time(), 7.0);
        assert!((clock.audio_time() - 1.0).abs() < 1e-9);
        clock.seek(0.5);
        assert_eq!(clock.current_time(), 0.5);
        assert!((clock.audio_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seek_clamps_to_media() {
        let mut clock = SampleClock::new(100, 10.0);
        clock.seek(-4.0);
        assert_eq!(clock.current_time(), 0.0);
        clock.seek(40.0);
        assert_eq!(clock.current_time(), 10.0);
        assert!(clock.is_finished());
        clock.seek(f64::NAN);
        assert_eq!(clock.current_time(), 10.0);
    }

    #[test]
    fn playback_rate_scales_media_time_only() {
        let mut clock = SampleClock::new(100, 10.0);
        clock.set_playback_rate(2.0);
        clock.advance(100);
        assert!((clock.current_time() - 2.0).abs() < 1e-9);
        assert!((clock.audio_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn position_stops_at_duration() {
        let mut clock = SampleClock::new(10, 1.0);
        clock.advance(50);
        assert_eq!(clock.current_time(), 1.0);
        assert!(clock.is_finished());
    }

    #[test]
    fn timer_fires_once_per_interval() {
        let mut timer = TimeUpdateTimer::new(Duration::from_millis(50));
        assert!(timer.due(0.0));
        assert!(!timer.due(0.01));
        assert!(!timer.due(0.049));
        assert!(timer.due(0.05));
        assert!(!timer.due(0.06));
        timer.fire_next();
        assert!(timer.due(0.06));
    }
}
