//! Speaker → gain-node lookup table.
//!
//! Some venues wire logical speaker slots to spatializer gain nodes in a
//! non-sequential order (e.g. speaker 1 driven by gain node 4). The table is
//! kept explicit instead of being derived from the layout, and is validated
//! once at load.

use arrayvec::ArrayVec;

use crate::error::ConfigError;
use crate::pattern::MAX_SPEAKERS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GainRouting {
    nodes: ArrayVec<usize, MAX_SPEAKERS>,
}

impl GainRouting {
    /// Speaker `i` drives gain node `i`.
    pub fn identity(speaker_count: usize) -> Self {
        Self {
            nodes: (0..speaker_count.min(MAX_SPEAKERS)).collect(),
        }
    }

    /// Explicit table: `table[speaker] = node`. Must be a permutation of
    /// `0..speaker_count`.
    pub fn from_table(table: &[usize], speaker_count: usize) -> Result<Self, ConfigError> {
        if table.len() != speaker_count {
            return Err(ConfigError::InvalidRouting {
                reason: "length differs from speaker count",
            });
        }
        if speaker_count > MAX_SPEAKERS {
            return Err(ConfigError::SpeakerCount { count: speaker_count });
        }
        let mut seen = [false; MAX_SPEAKERS];
        for &node in table {
            if node >= speaker_count {
                return Err(ConfigError::InvalidRouting {
                    reason: "references a node past the speaker count",
                });
            }
            if seen[node] {
                return Err(ConfigError::InvalidRouting {
                    reason: "maps two speakers to the same node",
                });
            }
            seen[node] = true;
        }
        Ok(Self {
            nodes: table.iter().copied().collect(),
        })
    }

    /// Gain node driven by `speaker`.
    pub fn node_for(&self, speaker: usize) -> Option<usize> {
        self.nodes.get(speaker).copied()
    }

    /// Speaker driven through `node` (inverse lookup).
    pub fn speaker_for(&self, node: usize) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
