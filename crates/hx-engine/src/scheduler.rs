//! Pattern scheduling.
//!
//! Resolves media time to a cue with a fresh binary search on every update
//! and pushes gain targets to the graph only when the active cue changes.

use std::time::Duration;

use hx_ir::Schedule;
use tracing::debug;

use crate::graph::SpatialGraph;
use crate::spatializer::Spatializer;

/// Outcome of one time update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeUpdate {
    /// Cue active at the reported time.
    pub cue: usize,
    /// True if this update started a pattern transition.
    pub changed: bool,
}

#[derive(Clone, Debug)]
pub struct PatternScheduler {
    schedule: Schedule,
    active: Option<usize>,
    ramp: Duration,
}

impl PatternScheduler {
    /// `ramp` is the transition length on the audio clock.
    pub fn new(schedule: Schedule, ramp: Duration) -> Self {
        Self {
            schedule,
            active: None,
            ramp,
        }
    }

    /// Cue active at media time `time`. Pure lookup, no side effects.
    pub fn resolve_pattern(&self, time: f64) -> usize {
        self.schedule.resolve(time)
    }

    /// Handle a media time update. `now` is the audio clock, which anchors
    /// any ramps this starts.
    pub fn on_time_update<S: Spatializer>(
        &mut self,
        time: f64,
        now: f64,
        graph: &mut SpatialGraph<S>,
    ) -> TimeUpdate {
        let cue = self.resolve_pattern(time);
        if self.active == Some(cue) {
            return TimeUpdate { cue, changed: false };
        }
        let Some(pattern) = self.schedule.pattern_for_cue(cue) else {
            return TimeUpdate { cue, changed: false };
        };
        debug!(from = ?self.active, to = cue, time, "pattern transition");
        for (speaker, &gain) in pattern.gains().iter().enumerate() {
            graph.set_target_gain(speaker, gain, self.ramp, now);
        }
        self.active = Some(cue);
        TimeUpdate { cue, changed: true }
    }

    /// Cue whose pattern was last pushed to the graph, if any.
    pub fn active_cue(&self) -> Option<usize> {
        self.active
    }

    /// Index into the pattern library of the pattern the graph is heading
    /// to. Differs from the cue index when cues share patterns.
    pub fn active_pattern(&self) -> Option<usize> {
        self.active
            .and_then(|cue| self.schedule.cue(cue))
            .map(|cue| cue.pattern)
    }

    /// Forget the active cue so the next update re-applies its pattern.
    pub fn reset(&mut self) {
        self.active = None;
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn ramp(&self) -> Duration {
        self.ramp
    }
}
