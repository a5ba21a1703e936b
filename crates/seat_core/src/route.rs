//! Per-episode route description and direction-parameterized index math.
//!
//! Direction is carried explicitly rather than re-derived from index order,
//! and all index arithmetic goes through the pure helpers below.

use serde::{Deserialize, Serialize};

use crate::{Direction, LineId};

/// Immutable description of one episode's ride, plus the mutable current
/// station index (advanced by the tick engine only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub line: LineId,
    /// Human-readable branch name, e.g. "outbound loop".
    pub direction_label: String,
    pub direction: Direction,
    /// Full ordered station list for the line.
    pub stations: Vec<String>,
    pub start_idx: usize,
    /// Exclusive bound of the ride: forward rides end at `end_idx - 1`,
    /// reverse rides at `end_idx + 1`. May be clipped by a scenario horizon.
    pub end_idx: usize,
    pub current_idx: usize,
}

impl Route {
    pub fn current_station(&self) -> &str {
        &self.stations[self.current_idx]
    }

    pub fn terminal_idx(&self) -> usize {
        terminal_idx(self.direction, self.end_idx)
    }

    pub fn at_terminal(&self) -> bool {
        self.current_idx == self.terminal_idx()
    }

    /// Advance one station toward the terminal; no-op once there.
    /// Returns the new index if the train moved.
    pub(crate) fn advance(&mut self) -> Option<usize> {
        if self.at_terminal() {
            return None;
        }
        self.current_idx = match self.direction {
            Direction::Forward => self.current_idx + 1,
            Direction::Reverse => self.current_idx - 1,
        };
        Some(self.current_idx)
    }

    /// Stations between the current index and the terminal (inclusive of the
    /// terminal itself).
    pub fn stops_to_terminal(&self) -> usize {
        match self.direction {
            Direction::Forward => self.terminal_idx().saturating_sub(self.current_idx),
            Direction::Reverse => self.current_idx.saturating_sub(self.terminal_idx()),
        }
    }

    /// Whether `idx` is a valid alighting station: on the route and strictly
    /// ahead of the current index, up to and including the terminal.
    pub fn is_ahead(&self, idx: usize) -> bool {
        if idx >= self.stations.len() {
            return false;
        }
        match self.direction {
            Direction::Forward => self.current_idx < idx && idx <= self.terminal_idx(),
            Direction::Reverse => self.terminal_idx() <= idx && idx < self.current_idx,
        }
    }

    /// Stops from the current station to `idx`, which must be ahead.
    pub fn stops_until(&self, idx: usize) -> Option<u32> {
        if !self.is_ahead(idx) {
            return None;
        }
        let stops = match self.direction {
            Direction::Forward => idx - self.current_idx,
            Direction::Reverse => self.current_idx - idx,
        };
        Some(stops as u32)
    }

    /// The next `n` station indices ahead of the current one, in travel order.
    pub fn upcoming(&self, n: usize) -> Vec<usize> {
        (1..=n)
            .filter_map(|step| match self.direction {
                Direction::Forward => {
                    let idx = self.current_idx + step;
                    (idx <= self.terminal_idx()).then_some(idx)
                }
                Direction::Reverse => self
                    .current_idx
                    .checked_sub(step)
                    .filter(|idx| *idx >= self.terminal_idx()),
            })
            .collect()
    }
}

/// Direction implied by a branch's `(start, end)` pair: `end < start` means
/// the train travels down the station list.
pub fn direction_of(start_idx: usize, end_idx: usize) -> Direction {
    if end_idx < start_idx {
        Direction::Reverse
    } else {
        Direction::Forward
    }
}

/// Final reachable station index for a ride bounded by `end_idx`.
pub fn terminal_idx(direction: Direction, end_idx: usize) -> usize {
    match direction {
        Direction::Forward => end_idx.saturating_sub(1),
        Direction::Reverse => end_idx + 1,
    }
}
