//! Per-mode standing-time records. Outlives episodes; cleared only on
//! explicit request.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::InfoMode;

/// Completed episodes kept per mode; oldest entries are evicted first.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandingHistory {
    rich: VecDeque<u32>,
    hidden: VecDeque<u32>,
}

impl StandingHistory {
    /// Append a completed episode's standing count for `mode`, evicting the
    /// oldest entry once at capacity.
    pub fn record(&mut self, mode: InfoMode, standing_count: u32) {
        let entries = self.entries_mut(mode);
        if entries.len() == HISTORY_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(standing_count);
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            rich: self.rich.iter().copied().collect(),
            hidden: self.hidden.iter().copied().collect(),
            rich_avg: average(&self.rich),
            hidden_avg: average(&self.hidden),
        }
    }

    pub fn clear(&mut self) {
        self.rich.clear();
        self.hidden.clear();
    }

    fn entries_mut(&mut self, mode: InfoMode) -> &mut VecDeque<u32> {
        match mode {
            InfoMode::Rich => &mut self.rich,
            InfoMode::Hidden => &mut self.hidden,
        }
    }
}

/// Chronological (oldest-first) entries plus running averages, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub rich: Vec<u32>,
    pub hidden: Vec<u32>,
    pub rich_avg: f64,
    pub hidden_avg: f64,
}

fn average(entries: &VecDeque<u32>) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    f64::from(entries.iter().sum::<u32>()) / entries.len() as f64
}
