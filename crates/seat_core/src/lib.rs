//! Deterministic seat-turnover simulation for one transit ride.
//!
//! The crate models a single tracked rider hunting for a seat in a subway
//! car under two information regimes: `Rich` (live per-seat countdowns and
//! a recommendation) and `Hidden` (blind queueing). Everything advances
//! through [`tick`], one station hop at a time, with all randomness drawn
//! from a caller-supplied [`rand::Rng`] so seeded runs replay exactly.
//!
//! No clocks, no IO, no global state: callers own a [`Session`] and drive
//! it. Route content and scenario definitions live in `seat_world`;
//! rider policies in `seat_control`.

mod engine;
mod history;
mod layout;
mod matching;
mod recommend;
mod route;
mod seeding;
mod session;
mod types;

pub use engine::{run_until_seated, tick, TickOutcome};
pub use history::{HistorySnapshot, StandingHistory, HISTORY_CAPACITY};
pub use layout::{seat_position, weighted_distance};
pub use matching::nearest_waiter;
pub use recommend::recommended_seat;
pub use route::{direction_of, terminal_idx, Route};
pub use seeding::{seed_car, seed_grid_waiters};
pub use session::{Episode, SeatChoice, Session};
pub use types::{
    Car, CarNo, Counters, Direction, Event, EventEnvelope, EventId, EventLevel, InfoMode,
    LineId, Occupant, OccupancySummary, RiderPlace, RiderState, Scenario, Seat, SeatActionError,
    SeatId, SimConstants, Waiter, SEAT_COUNT,
};

/// Wrap an event in an envelope with a fresh monotonic id.
pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
