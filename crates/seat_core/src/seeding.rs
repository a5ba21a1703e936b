//! Episode seeding: destinations for every seat, plus the initial standing
//! crowd. The two information modes seed waiters asymmetrically on purpose;
//! the statistical gap between them is what the comparison measures.

use rand::Rng;

use crate::{Car, Counters, Direction, InfoMode, Occupant, Route, SeatId, SimConstants, Waiter};

/// Pick a destination ahead of the current station.
///
/// With at least `min_seeded_ride` stations to spare before the route end,
/// the destination is uniform over indices at least that far ahead (never
/// past the end minus one). Otherwise it falls back to the nearest next
/// station with a forced countdown of 1, so no seat is ever seeded vacant.
pub(crate) fn draw_destination(
    route: &Route,
    constants: &SimConstants,
    rng: &mut impl Rng,
) -> (usize, u32) {
    let current = route.current_idx;
    let last = route.terminal_idx();

    match route.direction {
        Direction::Forward => {
            let far = current + constants.min_seeded_ride;
            if far <= last {
                let dest = rng.gen_range(far..=last);
                (dest, (dest - current) as u32)
            } else {
                ((current + 1).min(last), 1)
            }
        }
        Direction::Reverse => {
            let far = current.saturating_sub(constants.min_seeded_ride);
            if far >= last && current >= constants.min_seeded_ride {
                let dest = rng.gen_range(last..=far);
                (dest, (current - dest) as u32)
            } else {
                (current.saturating_sub(1).max(last), 1)
            }
        }
    }
}

pub(crate) fn seed_occupant(
    route: &Route,
    constants: &SimConstants,
    rng: &mut impl Rng,
) -> Occupant {
    let (destination_idx, stops_left) = draw_destination(route, constants, rng);
    Occupant {
        stops_left,
        destination_idx,
        app_user: rng.gen_bool(constants.app_user_ratio),
    }
}

/// The seat the next waiter should queue at, by mode.
///
/// Rich mode is greedy: the soonest-to-vacate occupied seat with an empty
/// slot (countdown ties go to the lowest seat id). Hidden mode picks
/// uniformly among eligible seats. `None` when no seat is eligible.
pub(crate) fn waiter_target(car: &Car, mode: InfoMode, rng: &mut impl Rng) -> Option<SeatId> {
    match mode {
        InfoMode::Rich => soonest_eligible(car),
        InfoMode::Hidden => {
            let eligible: Vec<SeatId> = car
                .seats()
                .filter(|(_, seat)| seat.accepts_waiter())
                .map(|(id, _)| id)
                .collect();
            if eligible.is_empty() {
                None
            } else {
                Some(eligible[rng.gen_range(0..eligible.len())])
            }
        }
    }
}

/// Occupied seat with an empty slot and the smallest countdown; ties break
/// to the lowest seat id.
pub(crate) fn soonest_eligible(car: &Car) -> Option<SeatId> {
    car.seats()
        .filter(|(_, seat)| seat.accepts_waiter())
        .min_by_key(|(id, seat)| (seat.countdown(), *id))
        .map(|(id, _)| id)
}

pub(crate) fn next_npc(counters: &mut Counters) -> Waiter {
    let id = counters.next_npc_id;
    counters.next_npc_id += 1;
    Waiter::Npc(id)
}

/// Fully occupy a car and seed its initial standing crowd (count uniform in
/// `car_waiters_min..=car_waiters_max`). Waiters that find no eligible seat
/// are skipped silently; seeding never fails, it only seeds fewer.
pub fn seed_car(
    route: &Route,
    mode: InfoMode,
    constants: &SimConstants,
    counters: &mut Counters,
    rng: &mut impl Rng,
) -> Car {
    let mut car = Car::default();
    for id in SeatId::all() {
        car.seat_mut(id).occupant = Some(seed_occupant(route, constants, rng));
    }

    let waiter_count = rng.gen_range(constants.car_waiters_min..=constants.car_waiters_max);
    for _ in 0..waiter_count {
        if let Some(target) = waiter_target(&car, mode, rng) {
            car.seat_mut(target).waiting = Some(next_npc(counters));
        }
    }
    car
}

/// Waiter seeding for single-car quick sessions: one independent coin per
/// seat slot instead of a drawn crowd size.
pub fn seed_grid_waiters(
    car: &mut Car,
    mode: InfoMode,
    constants: &SimConstants,
    counters: &mut Counters,
    rng: &mut impl Rng,
) {
    match mode {
        InfoMode::Rich => {
            let hits = SeatId::all()
                .filter(|_| rng.gen_bool(constants.replenish_probability))
                .count();
            for _ in 0..hits {
                if let Some(target) = soonest_eligible(car) {
                    car.seat_mut(target).waiting = Some(next_npc(counters));
                }
            }
        }
        InfoMode::Hidden => {
            for id in SeatId::all() {
                if rng.gen_bool(constants.replenish_probability) && car.seat(id).accepts_waiter() {
                    car.seat_mut(id).waiting = Some(next_npc(counters));
                }
            }
        }
    }
}
