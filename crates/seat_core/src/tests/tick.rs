use crate::test_fixtures::make_rng;
use crate::{
    tick, Event, EventLevel, InfoMode, Occupant, RiderPlace, SeatActionError, SeatChoice, SeatId,
    Session, SimConstants, Waiter,
};

use super::{frozen_constants, single_car_session};

fn occupy(session: &mut Session, seat: u8, stops_left: u32) {
    let episode = session.episode.as_mut().unwrap();
    let seat_id = SeatId::new(seat).unwrap();
    episode.cars[0].seat_mut(seat_id).occupant = Some(Occupant {
        stops_left,
        destination_idx: 19,
        app_user: false,
    });
}

fn npc_waits(session: &mut Session, seat: u8, npc: u32) {
    let episode = session.episode.as_mut().unwrap();
    let seat_id = SeatId::new(seat).unwrap();
    episode.cars[0].seat_mut(seat_id).waiting = Some(Waiter::Npc(npc));
}

fn seat(session: &Session, seat: u8) -> &crate::Seat {
    let episode = session.episode.as_ref().unwrap();
    episode.cars[0].seat(SeatId::new(seat).unwrap())
}

// ---------------------------------------------------------------- route ----

#[test]
fn route_clamps_at_terminal_but_seat_turnover_continues() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Hidden);
    session.episode.as_mut().unwrap().route.current_idx = 18;
    occupy(&mut session, 1, 3);

    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e.event, Event::StationAdvanced { station_idx: 19, .. })));
    assert_eq!(seat(&session, 1).countdown(), Some(2));

    // Parked at the terminal: no more station events, countdowns still run.
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert!(!out
        .events
        .iter()
        .any(|e| matches!(e.event, Event::StationAdvanced { .. })));
    assert_eq!(session.episode.as_ref().unwrap().route.current_idx, 19);
    assert_eq!(seat(&session, 1).countdown(), Some(1));
}

// ------------------------------------------------------------- standing ----

#[test]
fn standing_count_grows_only_while_the_rider_stands() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Rich);

    for _ in 0..3 {
        tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    }
    assert_eq!(session.episode.as_ref().unwrap().rider.standing_count, 3);

    session.sit_with_destination(2, 10).unwrap();
    tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert_eq!(session.episode.as_ref().unwrap().rider.standing_count, 3);
}

#[test]
fn countdown_zero_vacates_and_stands_a_seated_rider_up() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Rich);
    // Next station ahead of index 0.
    session.sit_with_destination(4, 1).unwrap();
    assert_eq!(seat(&session, 4).countdown(), Some(1));

    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    let rider = &session.episode.as_ref().unwrap().rider;
    assert_eq!(rider.place, RiderPlace::Standing);
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e.event, Event::SeatVacated { seat } if seat.get() == 4)));
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e.event, Event::RiderUnseated { seat } if seat.get() == 4)));
}

// ------------------------------------------------------------- matching ----

#[test]
fn rider_wins_the_seat_it_waits_at() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Rich);
    occupy(&mut session, 5, 3);
    assert_eq!(session.choose_seat(5).unwrap(), SeatChoice::Waiting(SeatId::new(5).unwrap()));

    for expected in [2, 1] {
        let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
        assert!(out.ended.is_none());
        assert_eq!(seat(&session, 5).countdown(), Some(expected));
    }
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert_eq!(out.ended, Some(3));
    assert!(session.episode.is_none());
    assert_eq!(session.history_snapshot().rich, vec![3]);
}

#[test]
fn closer_npc_takes_a_freed_seat_first() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Hidden);
    for id in 1..=14 {
        occupy(&mut session, id, 99);
    }
    occupy(&mut session, 4, 1);
    occupy(&mut session, 5, 3);
    npc_waits(&mut session, 4, 7);
    session.choose_seat(5).unwrap();

    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert!(out.ended.is_none());
    assert!(out.events.iter().any(|e| matches!(
        e.event,
        Event::WaiterSeated { seat, from_seat } if seat.get() == 4 && from_seat.get() == 4
    )));
    // The winner is reseeded as a regular occupant.
    assert!(seat(&session, 4).occupant.is_some());
    assert_eq!(seat(&session, 4).waiting, None);
    assert_eq!(seat(&session, 5).waiting, Some(Waiter::Rider));

    tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert_eq!(out.ended, Some(3));
    assert_eq!(session.history_snapshot().hidden, vec![3]);
}

#[test]
fn matching_weighs_rows_and_breaks_ties_low() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Rich);
    // Only seat 3 stays free; 10 is directly behind it in the other row.
    for id in [1, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14] {
        occupy(&mut session, id, 99);
    }
    npc_waits(&mut session, 4, 1); // distance 1.0
    npc_waits(&mut session, 10, 2); // distance 1.5 across the aisle
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert!(out.events.iter().any(|e| matches!(
        e.event,
        Event::WaiterSeated { seat, from_seat } if seat.get() == 3 && from_seat.get() == 4
    )));
    assert_eq!(seat(&session, 10).waiting, Some(Waiter::Npc(2)));

    // Equidistant waiters: the lower origin id wins.
    let mut session = single_car_session(InfoMode::Rich);
    for id in [1, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14] {
        occupy(&mut session, id, 99);
    }
    npc_waits(&mut session, 2, 1);
    npc_waits(&mut session, 4, 2);
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert!(out.events.iter().any(|e| matches!(
        e.event,
        Event::WaiterSeated { seat, from_seat } if seat.get() == 3 && from_seat.get() == 2
    )));
}

#[test]
fn rider_win_ends_the_tick_before_attrition_and_replenishment() {
    let constants = SimConstants {
        attrition_probability: 1.0,
        replenish_probability: 1.0,
        ..frozen_constants()
    };
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Rich);
    for id in 1..=14 {
        occupy(&mut session, id, if id == 1 { 1 } else { 99 });
    }
    npc_waits(&mut session, 14, 9);
    session.choose_seat(1).unwrap();

    let out = tick(&mut session, &constants, &mut rng, EventLevel::Debug).unwrap();
    assert_eq!(out.ended, Some(1));
    assert!(session.episode.is_none());
    assert!(!out
        .events
        .iter()
        .any(|e| matches!(e.event, Event::WaiterLeft { .. } | Event::WaiterJoined { .. })));
}

// ------------------------------------------------- attrition / replenish ----

#[test]
fn attrition_never_touches_the_rider() {
    let constants = SimConstants {
        attrition_probability: 1.0,
        replenish_probability: 0.0,
        ..frozen_constants()
    };
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Hidden);
    for id in 1..=14 {
        occupy(&mut session, id, 99);
    }
    npc_waits(&mut session, 7, 3);
    session.choose_seat(5).unwrap();

    let out = tick(&mut session, &constants, &mut rng, EventLevel::Debug).unwrap();
    assert_eq!(seat(&session, 7).waiting, None);
    assert_eq!(seat(&session, 5).waiting, Some(Waiter::Rider));
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e.event, Event::WaiterLeft { seat } if seat.get() == 7)));
}

#[test]
fn certain_replenishment_fills_every_eligible_slot_in_both_modes() {
    let constants = SimConstants {
        attrition_probability: 0.0,
        replenish_probability: 1.0,
        ..frozen_constants()
    };
    for mode in [InfoMode::Rich, InfoMode::Hidden] {
        let mut rng = make_rng();
        let mut session = single_car_session(mode);
        for id in 1..=14 {
            occupy(&mut session, id, 99);
        }
        tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
        let episode = session.episode.as_ref().unwrap();
        assert!(
            episode.cars[0].seats().all(|(_, s)| s.waiting.is_some()),
            "{mode:?}"
        );
    }
}

#[test]
fn debug_events_are_gated_by_level() {
    let constants = SimConstants {
        attrition_probability: 1.0,
        replenish_probability: 1.0,
        ..frozen_constants()
    };
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Hidden);
    for id in 1..=14 {
        occupy(&mut session, id, 99);
    }
    npc_waits(&mut session, 2, 1);
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert!(!out
        .events
        .iter()
        .any(|e| matches!(e.event, Event::WaiterLeft { .. } | Event::WaiterJoined { .. })));
}

// --------------------------------------------------------------- errors ----

#[test]
fn ticking_without_an_episode_or_car_is_an_error() {
    let constants = frozen_constants();
    let mut rng = make_rng();

    let mut session = Session::new();
    assert!(matches!(
        tick(&mut session, &constants, &mut rng, EventLevel::Normal),
        Err(SeatActionError::NoActiveEpisode)
    ));

    let mut session = single_car_session(InfoMode::Rich);
    session.episode.as_mut().unwrap().active_car = None;
    assert!(matches!(
        tick(&mut session, &constants, &mut rng, EventLevel::Normal),
        Err(SeatActionError::NoActiveEpisode)
    ));
}

#[test]
fn event_ids_are_monotonic_and_zero_padded() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Rich);
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert_eq!(out.events[0].id.0, "evt_000000");
    let out = tick(&mut session, &constants, &mut rng, EventLevel::Normal).unwrap();
    assert_eq!(out.events[0].id.0, "evt_000001");
}

#[test]
fn run_until_seated_gives_up_after_the_tick_budget() {
    let constants = frozen_constants();
    let mut rng = make_rng();
    let mut session = single_car_session(InfoMode::Rich);
    let result = crate::run_until_seated(&mut session, &constants, &mut rng, 5).unwrap();
    assert_eq!(result, None);
    assert!(session.episode.is_none());
    assert!(session.history_snapshot().rich.is_empty());
}
