//! Independent fixed-cadence timers for each data source.

use std::time::Instant;

use clawdeck_config::PollIntervals;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    Sessions,
    Processes,
    Health,
    /// Transcript or process log of the selected source.
    Logs,
}

impl PollKind {
    pub const ALL: [Self; 4] = [Self::Sessions, Self::Processes, Self::Health, Self::Logs];

    const fn slot(self) -> usize {
        match self {
            PollKind::Sessions => 0,
            PollKind::Processes => 1,
            PollKind::Health => 2,
            PollKind::Logs => 3,
        }
    }
}

/// Tracks when each kind last fetched. A kind that never fetched is due.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    intervals: PollIntervals,
    last: [Option<Instant>; 4],
}

impl PollSchedule {
    #[must_use]
    pub fn new(intervals: PollIntervals) -> Self {
        Self {
            intervals,
            last: [None; 4],
        }
    }

    #[must_use]
    pub fn due(&self, kind: PollKind, now: Instant) -> bool {
        let interval = match kind {
            PollKind::Sessions => self.intervals.sessions,
            PollKind::Processes => self.intervals.processes,
            PollKind::Health => self.intervals.health,
            PollKind::Logs => self.intervals.logs,
        };
        self.last[kind.slot()]
            .is_none_or(|last| now.saturating_duration_since(last) >= interval)
    }

    pub fn mark(&mut self, kind: PollKind, now: Instant) {
        self.last[kind.slot()] = Some(now);
    }
}
