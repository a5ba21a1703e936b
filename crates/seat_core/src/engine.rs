//! Deterministic tick loop.
//!
//! One tick is one station hop. Phase order is fixed:
//!
//! 1. advance the route (clamped at the terminal);
//! 2. destination-arrival hook (inert, see [`note_rider_arrival`]);
//! 3. bump the rider's standing count if not seated;
//! 4. countdown pass: decrement every occupant, vacate at zero;
//! 5. matching pass: each free seat, ascending, seats its nearest waiter.
//!    A rider win ends the episode here;
//! 6. attrition: each waiting NPC leaves with fixed probability;
//! 7. replenishment: new NPC waiters join, mode-dependent.
//!
//! All randomness comes through the caller-supplied `rng`, so identical
//! seeds replay identical episodes.

use rand::Rng;

use crate::matching::nearest_waiter;
use crate::seeding::{next_npc, seed_occupant, soonest_eligible};
use crate::session::{clear_rider_association, Episode};
use crate::{
    emit, Car, Counters, Event, EventEnvelope, EventLevel, InfoMode, RiderPlace, SeatActionError,
    SeatId, Session, SimConstants, Waiter, SEAT_COUNT,
};

/// What one tick produced.
#[derive(Debug)]
pub struct TickOutcome {
    pub events: Vec<EventEnvelope>,
    /// `Some(standing_count)` when the rider got matched into a seat this
    /// tick; the episode is over and has been recorded.
    pub ended: Option<u32>,
}

/// Advance the simulation by one station hop. Only the active car is
/// simulated; the rest of the train is a boarding-time snapshot.
pub fn tick(
    session: &mut Session,
    constants: &SimConstants,
    rng: &mut impl Rng,
    event_level: EventLevel,
) -> Result<TickOutcome, SeatActionError> {
    let mut events = Vec::new();
    let Some(episode) = session.episode.as_mut() else {
        return Err(SeatActionError::NoActiveEpisode);
    };
    if episode.active_car.is_none() {
        return Err(SeatActionError::NoActiveEpisode);
    }
    let tick_no = episode.ticks;
    let counters = &mut session.counters;

    // Phase 1: route advance.
    if let Some(idx) = episode.route.advance() {
        let station = episode.route.stations[idx].clone();
        events.push(emit(
            counters,
            tick_no,
            Event::StationAdvanced { station_idx: idx, station },
        ));
    }

    // Phase 2.
    note_rider_arrival(episode);

    // Phase 3.
    if !episode.rider.is_seated() {
        episode.rider.standing_count += 1;
    }

    // Phases 4 and 5 on the active car.
    countdown_pass(episode, counters, tick_no, &mut events);
    if let Some(standing_count) = matching_pass(episode, constants, counters, rng, tick_no, &mut events)
    {
        let mode = episode.mode;
        session.history.record(mode, standing_count);
        session.episode = None;
        return Ok(TickOutcome { events, ended: Some(standing_count) });
    }

    // Phases 6 and 7.
    let mode = episode.mode;
    let car = active_car_mut(episode);
    attrition_pass(car, constants, counters, rng, tick_no, event_level, &mut events);
    replenish_pass(
        car,
        mode,
        constants,
        counters,
        rng,
        tick_no,
        event_level,
        &mut events,
    );

    episode.ticks += 1;
    Ok(TickOutcome { events, ended: None })
}

fn active_car_mut(episode: &mut Episode) -> &mut Car {
    // Checked at the top of tick().
    let idx = usize::from(episode.active_car.map_or(0, |no| no.0 - 1));
    &mut episode.cars[idx]
}

/// Phase 2. Whether the current station is the rider's chosen destination
/// is computed and deliberately discarded; this hook is the extension point
/// for an alighting flow and stays inert until one exists.
fn note_rider_arrival(episode: &Episode) {
    let _arrived = episode
        .rider
        .destination_idx
        .is_some_and(|idx| idx == episode.route.current_idx);
}

/// Phase 4: every occupant of the active car loses one stop; at zero the
/// occupant leaves and the seat frees. A seated rider is stood back up and
/// keeps accumulating standing time from the next tick on.
fn countdown_pass(
    episode: &mut Episode,
    counters: &mut Counters,
    tick_no: u64,
    events: &mut Vec<EventEnvelope>,
) {
    let car_idx = usize::from(episode.active_car.map_or(0, |no| no.0 - 1));
    let Episode { cars, rider, .. } = episode;
    let car = &mut cars[car_idx];

    for seat_id in SeatId::all() {
        let seat = car.seat_mut(seat_id);
        let Some(occupant) = seat.occupant.as_mut() else {
            continue;
        };
        occupant.stops_left = occupant.stops_left.saturating_sub(1);
        if occupant.stops_left > 0 {
            continue;
        }
        seat.occupant = None;
        events.push(emit(counters, tick_no, Event::SeatVacated { seat: seat_id }));
        if rider.place == RiderPlace::SeatedAt(seat_id) {
            rider.place = RiderPlace::Standing;
            events.push(emit(counters, tick_no, Event::RiderUnseated { seat: seat_id }));
        }
    }
}

/// Phase 5: for each free seat in ascending id order, seat the waiter
/// nearest by weighted grid distance. An NPC winner becomes a fresh
/// occupant; a rider win returns `Some(standing_count)` and the caller ends
/// the episode (no further matching, attrition, or replenishment).
fn matching_pass(
    episode: &mut Episode,
    constants: &SimConstants,
    counters: &mut Counters,
    rng: &mut impl Rng,
    tick_no: u64,
    events: &mut Vec<EventEnvelope>,
) -> Option<u32> {
    let car_idx = usize::from(episode.active_car.map_or(0, |no| no.0 - 1));
    let Episode { cars, rider, route, .. } = episode;
    let car = &mut cars[car_idx];

    for seat_id in SeatId::all() {
        if !car.seat(seat_id).is_free() {
            continue;
        }
        let Some((origin, waiter)) = nearest_waiter(car, seat_id) else {
            continue;
        };
        car.seat_mut(origin).waiting = None;
        match waiter {
            Waiter::Rider => {
                rider.place = RiderPlace::SeatedAt(seat_id);
                events.push(emit(
                    counters,
                    tick_no,
                    Event::RiderSeated { seat: seat_id, standing_count: rider.standing_count },
                ));
                return Some(rider.standing_count);
            }
            Waiter::Npc(_) => {
                car.seat_mut(seat_id).occupant = Some(seed_occupant(route, constants, rng));
                events.push(emit(
                    counters,
                    tick_no,
                    Event::WaiterSeated { seat: seat_id, from_seat: origin },
                ));
            }
        }
    }
    None
}

/// Phase 6: each NPC waiter independently gives up with
/// `attrition_probability`. The rider never does.
fn attrition_pass(
    car: &mut Car,
    constants: &SimConstants,
    counters: &mut Counters,
    rng: &mut impl Rng,
    tick_no: u64,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    for seat_id in SeatId::all() {
        let seat = car.seat_mut(seat_id);
        let Some(waiter) = seat.waiting else { continue };
        if waiter.is_rider() {
            continue;
        }
        if rng.gen_bool(constants.attrition_probability) {
            seat.waiting = None;
            if event_level == EventLevel::Debug {
                events.push(emit(counters, tick_no, Event::WaiterLeft { seat: seat_id }));
            }
        }
    }
}

/// Phase 7: fresh NPC waiters join. Rich mode models informed arrivals:
/// `SEAT_COUNT` independent trials, each successful one claiming the seat
/// that frees soonest. Hidden mode rolls once per seat that still has an
/// occupant and an empty slot.
#[allow(clippy::too_many_arguments)]
fn replenish_pass(
    car: &mut Car,
    mode: InfoMode,
    constants: &SimConstants,
    counters: &mut Counters,
    rng: &mut impl Rng,
    tick_no: u64,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    match mode {
        InfoMode::Rich => {
            for _ in 0..SEAT_COUNT {
                if !rng.gen_bool(constants.replenish_probability) {
                    continue;
                }
                let Some(target) = soonest_eligible(car) else { break };
                car.seat_mut(target).waiting = Some(next_npc(counters));
                if event_level == EventLevel::Debug {
                    events.push(emit(counters, tick_no, Event::WaiterJoined { seat: target }));
                }
            }
        }
        InfoMode::Hidden => {
            for seat_id in SeatId::all() {
                if !car.seat(seat_id).accepts_waiter() {
                    continue;
                }
                if rng.gen_bool(constants.replenish_probability) {
                    car.seat_mut(seat_id).waiting = Some(next_npc(counters));
                    if event_level == EventLevel::Debug {
                        events.push(emit(counters, tick_no, Event::WaiterJoined { seat: seat_id }));
                    }
                }
            }
        }
    }
}

/// Run ticks until the rider is seated or `max_ticks` elapse. Returns the
/// recorded standing count on a win, `None` on timeout (episode discarded).
/// This is the scripted flow used by paired-mode comparisons.
pub fn run_until_seated(
    session: &mut Session,
    constants: &SimConstants,
    rng: &mut impl Rng,
    max_ticks: u64,
) -> Result<Option<u32>, SeatActionError> {
    for _ in 0..max_ticks {
        let outcome = tick(session, constants, rng, EventLevel::Normal)?;
        if let Some(count) = outcome.ended {
            return Ok(Some(count));
        }
    }
    if let Some(episode) = session.episode.as_mut() {
        clear_rider_association(episode);
    }
    session.episode = None;
    Ok(None)
}
