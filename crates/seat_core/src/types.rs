//! Type definitions for `seat_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

/// Seats in a car, numbered 1..=14 (two rows of 7).
pub const SEAT_COUNT: u8 = 14;

/// A seat number, always in 1..=14. Construct via [`SeatId::new`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SeatId(u8);

impl SeatId {
    pub fn new(raw: u8) -> Option<Self> {
        (1..=SEAT_COUNT).contains(&raw).then_some(Self(raw))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into a car's seat array.
    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// All seat ids in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=SEAT_COUNT).map(Self)
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

/// A car number within the train, 1..=`SimConstants::car_count`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CarNo(pub u8);

impl std::fmt::Display for CarNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "car {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub String);

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// The two information regimes the comparison measures.
///
/// `Rich` exposes destinations and countdowns (greedy seeding, recommendation
/// available); `Hidden` models a passenger with no seat-availability
/// foresight (uniform-random seeding, no recommendation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfoMode {
    Rich,
    Hidden,
}

/// Travel direction along the station list. `Reverse` means indices decrease
/// toward the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Who holds a seat's waiting slot: the tracked rider, or a background
/// passenger with an id allocated from [`Counters::next_npc_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waiter {
    Rider,
    Npc(u32),
}

impl Waiter {
    pub fn is_rider(self) -> bool {
        matches!(self, Self::Rider)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

// ---------------------------------------------------------------------------
// Seat & car state
// ---------------------------------------------------------------------------

/// A seated passenger. Present iff the seat is occupied, which makes the
/// "occupied iff countdown known iff destination known" invariant structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Stations remaining before this passenger vacates the seat.
    pub stops_left: u32,
    /// Index into the route's station list.
    pub destination_idx: usize,
    /// Whether this passenger shares their destination (display only).
    pub app_user: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub occupant: Option<Occupant>,
    /// Single-capacity waiting slot. One waiter per seat, never more.
    pub waiting: Option<Waiter>,
}

impl Seat {
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn countdown(&self) -> Option<u32> {
        self.occupant.as_ref().map(|o| o.stops_left)
    }

    /// Occupied with an empty waiting slot; the only seats waiters may join.
    pub fn accepts_waiter(&self) -> bool {
        self.occupant.is_some() && self.waiting.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    seats: [Seat; SEAT_COUNT as usize],
}

impl Default for Car {
    fn default() -> Self {
        Self {
            seats: std::array::from_fn(|_| Seat::default()),
        }
    }
}

impl Car {
    pub fn seat(&self, id: SeatId) -> &Seat {
        &self.seats[id.index()]
    }

    pub fn seat_mut(&mut self, id: SeatId) -> &mut Seat {
        &mut self.seats[id.index()]
    }

    /// Seats paired with their ids, ascending.
    pub fn seats(&self) -> impl Iterator<Item = (SeatId, &Seat)> {
        SeatId::all().map(|id| (id, self.seat(id)))
    }

    /// Occupancy summary against the fixed car capacity, for display only.
    pub fn occupancy(&self, constants: &SimConstants) -> OccupancySummary {
        let seated = self.seats().filter(|(_, s)| !s.is_free()).count() as u32;
        let standing = self.seats().filter(|(_, s)| s.waiting.is_some()).count() as u32;
        let app_users = self
            .seats()
            .filter(|(_, s)| s.occupant.as_ref().is_some_and(|o| o.app_user))
            .count() as u32;
        let percent = ((seated + standing) * 100 / constants.car_capacity).min(100);
        OccupancySummary {
            seated,
            standing,
            app_users,
            occupancy_percent: percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancySummary {
    pub seated: u32,
    pub standing: u32,
    pub app_users: u32,
    pub occupancy_percent: u32,
}

// ---------------------------------------------------------------------------
// Rider state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiderPlace {
    #[default]
    Standing,
    /// Holds the waiting slot of this seat.
    WaitingAt(SeatId),
    /// Occupies this seat.
    SeatedAt(SeatId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderState {
    pub place: RiderPlace,
    /// Ticks elapsed while not seated. Monotonic within an episode.
    pub standing_count: u32,
    /// The rider's own chosen alighting station, if any.
    pub destination_idx: Option<usize>,
}

impl RiderState {
    pub fn is_seated(&self) -> bool {
        matches!(self.place, RiderPlace::SeatedAt(_))
    }
}

// ---------------------------------------------------------------------------
// Scenario & session plumbing
// ---------------------------------------------------------------------------

/// A fixed starting condition (line, direction, station, horizon) used to
/// run matched episodes across both information modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub line: LineId,
    pub direction_label: String,
    pub station: String,
    /// The episode is clipped to at most this many stops.
    pub max_stops: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_npc_id: u32,
}

/// Content-supplied tunables. Loaded from `constants.json` by `seat_world`;
/// tests override the probability fields to pin probabilistic branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConstants {
    /// Cars per train.
    pub car_count: u8,
    /// Seats plus standing room, used only for occupancy percentages.
    pub car_capacity: u32,
    /// Seeded occupants ride at least this many stops when room allows.
    pub min_seeded_ride: usize,
    /// Fraction of seeded occupants flagged as app users.
    pub app_user_ratio: f64,
    pub car_waiters_min: u32,
    pub car_waiters_max: u32,
    /// Per-tick chance an NPC waiter gives up its slot.
    pub attrition_probability: f64,
    /// Per-attempt chance a new waiter joins during replenishment.
    pub replenish_probability: f64,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StationAdvanced {
        station_idx: usize,
        station: String,
    },
    SeatVacated {
        seat: SeatId,
    },
    /// An NPC waiter won the match for a freed seat.
    WaiterSeated {
        seat: SeatId,
        from_seat: SeatId,
    },
    /// The rider won a match or sat down directly; the episode is over.
    RiderSeated {
        seat: SeatId,
        standing_count: u32,
    },
    /// The rider's seat emptied out from under them (chosen-destination ride).
    RiderUnseated {
        seat: SeatId,
    },
    /// Only emitted at `EventLevel::Debug`.
    WaiterLeft {
        seat: SeatId,
    },
    /// Only emitted at `EventLevel::Debug`.
    WaiterJoined {
        seat: SeatId,
    },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected rider actions. Every rejection is a no-op: state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatActionError {
    /// Seat id outside 1..=14.
    InvalidSeatId(u8),
    /// Car number outside the train.
    InvalidCar(u8),
    /// Station not on the current route, or not ahead of the rider.
    InvalidDestination(usize),
    /// Target seat already has a waiter (and is not free).
    SeatUnavailable(SeatId),
    /// No route/car initialized, or no car selected yet.
    NoActiveEpisode,
}

impl std::fmt::Display for SeatActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSeatId(raw) => write!(f, "seat id {raw} is outside 1..=14"),
            Self::InvalidCar(raw) => write!(f, "car number {raw} is not on this train"),
            Self::InvalidDestination(idx) => {
                write!(f, "station index {idx} is not ahead on the current route")
            }
            Self::SeatUnavailable(seat) => {
                write!(f, "{seat} already has a waiter")
            }
            Self::NoActiveEpisode => f.write_str("no active episode"),
        }
    }
}

impl std::error::Error for SeatActionError {}
