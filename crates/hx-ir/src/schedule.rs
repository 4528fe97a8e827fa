//! The cue list: an ordered, gapless partition of the timeline.
//!
//! Cue `i` owns the half-open interval `[timestamps[i], timestamps[i+1])`;
//! the last cue extends to the end of the media. A `Schedule` can only be
//! built through the validating constructors, so every instance satisfies:
//!
//! - at least one cue, the first at 0 s
//! - timestamps finite and strictly increasing
//! - every pattern has exactly `speaker_count` gains, each in [0, 1]

use alloc::vec::Vec;

use crate::error::ConfigError;
use crate::pattern::{Pattern, MAX_SPEAKERS};

/// A timestamp paired with the pattern that becomes active there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cue {
    /// Seconds from media start.
    pub timestamp: f64,
    /// Index into the schedule's pattern list.
    pub pattern: usize,
}

/// Read-only timestamp → pattern lookup table.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    cues: Vec<Cue>,
    patterns: Vec<Pattern>,
    speaker_count: usize,
}

impl Schedule {
    /// Build from parallel arrays: `presets[i]` is active from `timestamps[i]`.
    pub fn new<P: AsRef<[f32]>>(
        timestamps: &[f64],
        presets: &[P],
        speaker_count: usize,
    ) -> Result<Self, ConfigError> {
        if timestamps.len() != presets.len() {
            return Err(ConfigError::LengthMismatch {
                timestamps: timestamps.len(),
                presets: presets.len(),
            });
        }
        let patterns = build_patterns(presets, speaker_count)?;
        let cues = timestamps
            .iter()
            .enumerate()
            .map(|(i, &timestamp)| Cue { timestamp, pattern: i })
            .collect();
        Self::validated(cues, patterns, speaker_count)
    }

    /// Build from a pattern library and cues that reference it by index.
    /// The same pattern may be reused by several cues.
    pub fn from_cues<P: AsRef<[f32]>>(
        library: &[P],
        cues: &[Cue],
        speaker_count: usize,
    ) -> Result<Self, ConfigError> {
        let patterns = build_patterns(library, speaker_count)?;
        for (cue, c) in cues.iter().enumerate() {
            if c.pattern >= patterns.len() {
                return Err(ConfigError::UnknownPattern {
                    cue,
                    pattern: c.pattern,
                    available: patterns.len(),
                });
            }
        }
        Self::validated(cues.to_vec(), patterns, speaker_count)
    }

    fn validated(
        cues: Vec<Cue>,
        patterns: Vec<Pattern>,
        speaker_count: usize,
    ) -> Result<Self, ConfigError> {
        let first = cues.first().ok_or(ConfigError::EmptySchedule)?;
        if !first.timestamp.is_finite() {
            return Err(ConfigError::NonFiniteTimestamp { index: 0 });
        }
        if first.timestamp != 0.0 {
            return Err(ConfigError::FirstCueNotZero { first: first.timestamp });
        }
        for (index, pair) in cues.windows(2).enumerate() {
            let (previous, current) = (pair[0].timestamp, pair[1].timestamp);
            if !current.is_finite() {
                return Err(ConfigError::NonFiniteTimestamp { index: index + 1 });
            }
            if current <= previous {
                return Err(ConfigError::NonIncreasingTimestamps {
                    index: index + 1,
                    previous,
                    current,
                });
            }
        }
        Ok(Self { cues, patterns, speaker_count })
    }

    /// Index of the cue active at `time` seconds.
    ///
    /// Binary search, fresh on every call, so seeks in either direction are
    /// handled. Times before 0 (or NaN) resolve to cue 0; times past the last
    /// timestamp resolve to the last cue. A time exactly on a timestamp
    /// belongs to the cue starting there.
    pub fn resolve(&self, time: f64) -> usize {
        self.cues
            .partition_point(|cue| cue.timestamp <= time)
            .saturating_sub(1)
    }

    pub fn cue(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Pattern played during cue `index`.
    pub fn pattern_for_cue(&self, index: usize) -> Option<&Pattern> {
        self.cues.get(index).and_then(|c| self.patterns.get(c.pattern))
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// `[start, end)` of cue `index`; `end` is `None` for the last cue.
    pub fn interval(&self, index: usize) -> Option<(f64, Option<f64>)> {
        let start = self.cues.get(index)?.timestamp;
        let end = self.cues.get(index + 1).map(|c| c.timestamp);
        Some((start, end))
    }

    pub fn speaker_count(&self) -> usize {
        self.speaker_count
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Always false for a validated schedule; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

fn build_patterns<P: AsRef<[f32]>>(
    presets: &[P],
    speaker_count: usize,
) -> Result<Vec<Pattern>, ConfigError> {
    if speaker_count == 0 || speaker_count > MAX_SPEAKERS {
        return Err(ConfigError::SpeakerCount { count: speaker_count });
    }
    presets
        .iter()
        .enumerate()
        .map(|(index, gains)| {
            let gains = gains.as_ref();
            if gains.len() != speaker_count {
                return Err(ConfigError::PatternLength {
                    index,
                    expected: speaker_count,
                    found: gains.len(),
                });
            }
            Pattern::new(index, gains)
        })
        .collect()
}
