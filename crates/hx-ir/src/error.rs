//! Configuration errors detected while loading a show.

use thiserror::Error;

/// A malformed layout or schedule. Fatal at load time.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("schedule has no cues")]
    EmptySchedule,
    #[error("first cue must start at 0, found {first}")]
    FirstCueNotZero { first: f64 },
    #[error("timestamp {index} is not finite")]
    NonFiniteTimestamp { index: usize },
    #[error("timestamps must be strictly increasing: [{index}] = {current} after {previous}")]
    NonIncreasingTimestamps {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("{timestamps} timestamps but {presets} presets")]
    LengthMismatch { timestamps: usize, presets: usize },
    #[error("pattern {index} has {found} gains, expected {expected}")]
    PatternLength {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("pattern {pattern} speaker {speaker}: gain {value} outside [0, 1]")]
    GainOutOfRange {
        pattern: usize,
        speaker: usize,
        value: f32,
    },
    #[error("cue {cue} references pattern {pattern}, library has {available}")]
    UnknownPattern {
        cue: usize,
        pattern: usize,
        available: usize,
    },
    #[error("schedule drives {schedule} speakers, layout has {layout}")]
    LayoutMismatch { schedule: usize, layout: usize },
    #[error("speaker count {count} outside 1..=8")]
    SpeakerCount { count: usize },
    #[error("speaker ring geometry must be finite with a positive radius")]
    InvalidGeometry,
    #[error("routing table {reason}")]
    InvalidRouting { reason: &'static str },
}
