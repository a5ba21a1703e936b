use crate::{InfoMode, Occupant, SeatId, Session, Waiter};

use super::single_car_session;

fn occupy(session: &mut Session, seat: u8, stops_left: u32) {
    let episode = session.episode.as_mut().unwrap();
    episode.cars[0].seat_mut(SeatId::new(seat).unwrap()).occupant = Some(Occupant {
        stops_left,
        destination_idx: 19,
        app_user: false,
    });
}

fn npc_waits(session: &mut Session, seat: u8) {
    let episode = session.episode.as_mut().unwrap();
    episode.cars[0].seat_mut(SeatId::new(seat).unwrap()).waiting = Some(Waiter::Npc(0));
}

#[test]
fn recommends_the_soonest_free_slot() {
    let mut session = single_car_session(InfoMode::Rich);
    occupy(&mut session, 3, 6);
    occupy(&mut session, 7, 2);
    occupy(&mut session, 11, 4);
    assert_eq!(session.recommended_seat(), SeatId::new(7));
}

#[test]
fn taken_slots_are_skipped() {
    let mut session = single_car_session(InfoMode::Rich);
    occupy(&mut session, 3, 6);
    occupy(&mut session, 7, 2);
    npc_waits(&mut session, 7);
    assert_eq!(session.recommended_seat(), SeatId::new(3));
}

#[test]
fn countdown_ties_break_to_the_lowest_seat() {
    let mut session = single_car_session(InfoMode::Rich);
    occupy(&mut session, 9, 4);
    occupy(&mut session, 2, 4);
    occupy(&mut session, 13, 4);
    assert_eq!(session.recommended_seat(), SeatId::new(2));
}

#[test]
fn only_strictly_better_seats_beat_the_riders_current_wait() {
    let mut session = single_car_session(InfoMode::Rich);
    occupy(&mut session, 4, 3);
    occupy(&mut session, 8, 3);
    occupy(&mut session, 12, 5);
    session.choose_seat(4).unwrap();

    // Nothing frees strictly sooner than the rider's own seat.
    assert_eq!(session.recommended_seat(), None);

    occupy(&mut session, 1, 1);
    assert_eq!(session.recommended_seat(), SeatId::new(1));
}

#[test]
fn hidden_mode_and_empty_states_get_no_recommendation() {
    let mut session = single_car_session(InfoMode::Hidden);
    occupy(&mut session, 5, 1);
    assert_eq!(session.recommended_seat(), None);

    // Rich, but nothing occupied.
    let session = single_car_session(InfoMode::Rich);
    assert_eq!(session.recommended_seat(), None);

    // No episode at all.
    assert_eq!(Session::new().recommended_seat(), None);
}
