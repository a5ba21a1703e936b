//! Seat recommendation, the rich-mode payoff.

use crate::{Episode, InfoMode, RiderPlace, SeatId};

/// The occupied seat with an empty waiting slot whose countdown is lowest,
/// ties broken by lowest seat id. Hidden mode gets nothing. If the rider is
/// already waiting somewhere, only seats that free strictly sooner than the
/// rider's current pick qualify; a recommendation that cannot beat the
/// rider's position is worse than silence.
pub fn recommended_seat(episode: &Episode) -> Option<SeatId> {
    if episode.mode != InfoMode::Rich {
        return None;
    }
    let car = episode.active_car()?;
    let rider_wait = match episode.rider.place {
        RiderPlace::WaitingAt(seat_id) => car.seat(seat_id).countdown(),
        _ => None,
    };
    car.seats()
        .filter(|(_, seat)| seat.accepts_waiter())
        .filter_map(|(seat_id, seat)| seat.countdown().map(|c| (seat_id, c)))
        .filter(|&(_, countdown)| rider_wait.map_or(true, |limit| countdown < limit))
        .min_by_key(|&(seat_id, countdown)| (countdown, seat_id))
        .map(|(seat_id, _)| seat_id)
}
