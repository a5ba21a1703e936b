use crate::test_fixtures::{base_constants, base_route, make_rng};
use crate::{
    seed_car, seed_grid_waiters, Car, Counters, Direction, InfoMode, Route, SeatId, Waiter,
    SEAT_COUNT,
};

use super::frozen_constants;

#[test]
fn seeded_car_has_no_empty_seat() {
    let mut rng = make_rng();
    let mut counters = Counters::default();
    let car = seed_car(
        &base_route(),
        InfoMode::Rich,
        &base_constants(),
        &mut counters,
        &mut rng,
    );
    assert!(car.seats().all(|(_, seat)| seat.occupant.is_some()));
}

#[test]
fn seeded_destinations_lie_ahead_with_consistent_countdowns() {
    let route = base_route();
    let constants = base_constants();
    let mut rng = make_rng();
    let mut counters = Counters::default();
    let car = seed_car(&route, InfoMode::Hidden, &constants, &mut counters, &mut rng);

    for (id, seat) in car.seats() {
        let occupant = seat.occupant.as_ref().unwrap();
        assert!(
            route.is_ahead(occupant.destination_idx),
            "{id}: destination {} not ahead",
            occupant.destination_idx
        );
        assert_eq!(
            route.stops_until(occupant.destination_idx),
            Some(occupant.stops_left),
            "{id}: countdown disagrees with destination"
        );
        // 19 stations remain from the start, well past the minimum band.
        assert!(occupant.stops_left >= constants.min_seeded_ride as u32);
    }
}

#[test]
fn short_horizon_seeding_falls_back_to_the_next_station() {
    let constants = base_constants();

    // Forward, three stops left to the terminal at 19: less room than
    // min_seeded_ride, so every occupant rides exactly one stop.
    let mut route = base_route();
    route.current_idx = 16;
    let mut rng = make_rng();
    let mut counters = Counters::default();
    let car = seed_car(&route, InfoMode::Rich, &constants, &mut counters, &mut rng);
    for (id, seat) in car.seats() {
        let occupant = seat.occupant.as_ref().unwrap();
        assert_eq!(occupant.destination_idx, 17, "{id}");
        assert_eq!(occupant.stops_left, 1, "{id}");
        assert!(route.is_ahead(occupant.destination_idx));
    }

    // Reverse mirror: current 5, terminal 3.
    let route = Route {
        direction: Direction::Reverse,
        start_idx: 19,
        end_idx: 2,
        current_idx: 5,
        ..base_route()
    };
    let car = seed_car(&route, InfoMode::Hidden, &constants, &mut counters, &mut rng);
    for (id, seat) in car.seats() {
        let occupant = seat.occupant.as_ref().unwrap();
        assert_eq!(occupant.destination_idx, 4, "{id}");
        assert_eq!(occupant.stops_left, 1, "{id}");
        assert!(route.is_ahead(occupant.destination_idx));
    }
}

#[test]
fn reverse_seeding_draws_destinations_down_the_line() {
    let constants = base_constants();
    let route = Route {
        direction: Direction::Reverse,
        start_idx: 19,
        end_idx: 2,
        current_idx: 15,
        ..base_route()
    };
    let mut rng = make_rng();
    let mut counters = Counters::default();
    let car = seed_car(&route, InfoMode::Hidden, &constants, &mut counters, &mut rng);

    for (id, seat) in car.seats() {
        let occupant = seat.occupant.as_ref().unwrap();
        assert!(
            route.is_ahead(occupant.destination_idx),
            "{id}: destination {} not ahead",
            occupant.destination_idx
        );
        assert_eq!(
            route.stops_until(occupant.destination_idx),
            Some(occupant.stops_left),
            "{id}: countdown disagrees with destination"
        );
        assert!(occupant.stops_left >= constants.min_seeded_ride as u32);
    }
}

#[test]
fn waiter_count_stays_within_the_configured_band() {
    let constants = base_constants();
    for mode in [InfoMode::Rich, InfoMode::Hidden] {
        let mut rng = make_rng();
        let mut counters = Counters::default();
        let car = seed_car(&base_route(), mode, &constants, &mut counters, &mut rng);
        let waiters = car.seats().filter(|(_, s)| s.waiting.is_some()).count() as u32;
        assert!(
            (constants.car_waiters_min..=constants.car_waiters_max).contains(&waiters),
            "{mode:?}: {waiters} waiters"
        );
        assert!(car
            .seats()
            .all(|(_, s)| !matches!(s.waiting, Some(Waiter::Rider))));
    }
}

#[test]
fn rich_seeding_queues_on_the_soonest_seats() {
    let mut rng = make_rng();
    let mut counters = Counters::default();
    let car = seed_car(
        &base_route(),
        InfoMode::Rich,
        &base_constants(),
        &mut counters,
        &mut rng,
    );

    // Greedy placement means the waited seats are exactly the first k in
    // (countdown, id) order.
    let mut by_countdown: Vec<(u32, SeatId, bool)> = car
        .seats()
        .map(|(id, seat)| (seat.countdown().unwrap(), id, seat.waiting.is_some()))
        .collect();
    by_countdown.sort_by_key(|&(countdown, id, _)| (countdown, id));
    let k = by_countdown.iter().filter(|&&(_, _, waited)| waited).count();
    for (rank, &(_, id, waited)) in by_countdown.iter().enumerate() {
        assert_eq!(waited, rank < k, "{id} out of greedy order");
    }
}

#[test]
fn npc_ids_are_unique_across_cars() {
    let mut rng = make_rng();
    let mut counters = Counters::default();
    let constants = base_constants();
    let route = base_route();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..3 {
        let car = seed_car(&route, InfoMode::Hidden, &constants, &mut counters, &mut rng);
        for (_, seat) in car.seats() {
            if let Some(Waiter::Npc(id)) = seat.waiting {
                assert!(seen.insert(id), "npc id {id} reused");
            }
        }
    }
}

#[test]
fn grid_seeding_with_certain_coin_fills_every_slot() {
    let route = base_route();
    let constants = crate::SimConstants {
        replenish_probability: 1.0,
        ..base_constants()
    };
    for mode in [InfoMode::Rich, InfoMode::Hidden] {
        let mut rng = make_rng();
        let mut counters = Counters::default();
        let mut car = seed_occupied_car(&mut rng, &mut counters);
        seed_grid_waiters(&mut car, mode, &constants, &mut counters, &mut rng);
        let waited = car.seats().filter(|(_, s)| s.waiting.is_some()).count();
        assert_eq!(waited, usize::from(SEAT_COUNT), "{mode:?}");
    }
}

#[test]
fn grid_seeding_with_zero_coin_adds_nobody() {
    let mut rng = make_rng();
    let mut counters = Counters::default();
    let mut car = seed_occupied_car(&mut rng, &mut counters);
    seed_grid_waiters(
        &mut car,
        InfoMode::Rich,
        &frozen_constants(),
        &mut counters,
        &mut rng,
    );
    assert!(car.seats().all(|(_, s)| s.waiting.is_none()));
}

fn seed_occupied_car(rng: &mut impl rand::Rng, counters: &mut Counters) -> Car {
    let mut car = seed_car(
        &base_route(),
        InfoMode::Hidden,
        &base_constants(),
        counters,
        rng,
    );
    for id in SeatId::all() {
        car.seat_mut(id).waiting = None;
    }
    car
}
