//! Gain patterns (presets).

use arrayvec::ArrayVec;

use crate::error::ConfigError;

/// Largest supported speaker count (premiere layout).
pub const MAX_SPEAKERS: usize = 8;

/// One gain value per speaker, each in [0, 1].
///
/// Immutable once built; identified by its position in the schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    gains: ArrayVec<f32, MAX_SPEAKERS>,
}

impl Pattern {
    /// Build a pattern, rejecting gains outside [0, 1] or more than
    /// `MAX_SPEAKERS` entries. `index` is only used for the error report.
    pub fn new(index: usize, gains: &[f32]) -> Result<Self, ConfigError> {
        if gains.len() > MAX_SPEAKERS {
            return Err(ConfigError::PatternLength {
                index,
                expected: MAX_SPEAKERS,
                found: gains.len(),
            });
        }
        let mut out = ArrayVec::new();
        for (speaker, &value) in gains.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::GainOutOfRange {
                    pattern: index,
                    speaker,
                    value,
                });
            }
            out.push(value);
        }
        Ok(Self { gains: out })
    }

    /// A pattern with only `speaker` at full gain.
    pub fn solo(speaker_count: usize, speaker: usize) -> Self {
        let mut gains = ArrayVec::new();
        for i in 0..speaker_count.min(MAX_SPEAKERS) {
            gains.push(if i == speaker { 1.0 } else { 0.0 });
        }
        Self { gains }
    }

    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    pub fn gain(&self, speaker: usize) -> Option<f32> {
        self.gains.get(speaker).copied()
    }

    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Indices of speakers with non-zero gain.
    pub fn active_speakers(&self) -> impl Iterator<Item = usize> + '_ {
        self.gains
            .iter()
            .enumerate()
            .filter(|&(_, &g)| g > 0.0)
            .map(|(i, _)| i)
    }
}
